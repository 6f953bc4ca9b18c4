//! Brand research: the submission types, the orchestrator that enriches a brand,
//! and the HTTP handlers over research records and their leads.

pub mod handlers;
pub mod orchestrator;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::research::BrandResearchDetail;
use crate::store::NewLead;

pub use orchestrator::ResearchOrchestrator;

/// Body of `POST /api/v1/research`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    pub brand_name: String,
    #[serde(alias = "user_company_info")]
    pub sender_company_info: String,
    pub outreach_goal: String,
    pub desired_cta: String,
    /// Leads to attach once enrichment is committed.
    #[serde(default)]
    pub leads: Vec<NewLead>,
}

impl ResearchRequest {
    /// Trims every input and rejects blanks.
    pub fn validate(mut self) -> Result<Self, AppError> {
        for (field, value) in [
            ("brand_name", &mut self.brand_name),
            ("sender_company_info", &mut self.sender_company_info),
            ("outreach_goal", &mut self.outreach_goal),
            ("desired_cta", &mut self.desired_cta),
        ] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AppError::Validation(format!("{field} must not be empty")));
            }
            *value = trimmed.to_string();
        }
        for lead in &self.leads {
            validate_lead(lead)?;
        }
        Ok(self)
    }
}

pub fn validate_lead(lead: &NewLead) -> Result<(), AppError> {
    if lead.name.trim().is_empty() || lead.company_name.trim().is_empty() {
        return Err(AppError::Validation(
            "lead name and company_name must not be empty".to_string(),
        ));
    }
    if !lead.email.contains('@') {
        return Err(AppError::Validation(format!(
            "lead email '{}' is not a valid address",
            lead.email
        )));
    }
    if lead.status.trim().is_empty() {
        return Err(AppError::Validation("lead status must not be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStage {
    SimilarBrands,
    EmailDiscovery,
    EmailDraft,
    Lead,
}

/// A non-fatal failure recorded while enriching a research record.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentIssue {
    pub stage: EnrichmentStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub message: String,
}

/// Result of one research run. `degraded` is set when any enrichment step failed
/// and the record holds partial data.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub research: BrandResearchDetail,
    pub degraded: bool,
    pub issues: Vec<EnrichmentIssue>,
}
