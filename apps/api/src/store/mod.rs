//! Credential and research store.
//!
//! `CrmStore` is the only way handlers, accounts and the research orchestrator touch
//! persisted state. `PgStore` is the production backend; tests run against
//! `memory::MemoryStore`, which enforces the same uniqueness and cascade rules.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::research::{BrandResearchDetail, BrandResearchRecord, LeadEntry};
use crate::models::user::UserAccount;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. `field` names the offending column.
    #[error("{field} already exists")]
    Conflict { field: String },

    /// The row a write depends on does not exist.
    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewResearch {
    pub brand_name: String,
    pub sender_company_info: String,
    pub outreach_goal: String,
    pub desired_cta: String,
    pub industry_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmail {
    pub email_address: String,
    pub status: String,
}

/// Everything derived for one similar brand during an enrichment pass.
#[derive(Debug, Clone)]
pub struct SimilarBrandDraft {
    pub brand_name: String,
    pub domain: String,
    pub tailored_email: Option<String>,
    pub email: Option<NewEmail>,
}

/// The replaceable part of a research record, written as one unit.
#[derive(Debug, Clone, Default)]
pub struct ResearchEnrichment {
    pub similar_brands: Vec<SimilarBrandDraft>,
    pub tailored_email_draft: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub company_name: String,
    pub email: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default = "default_lead_status")]
    pub status: String,
}

fn default_lead_status() -> String {
    "not contacted".to_string()
}

#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when username, email or phone is taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<UserAccount>, StoreError>;

    /// Creates the anchor row for a brand, or reuses the existing one.
    /// On reuse the outreach inputs are overwritten and `industry_label` is kept.
    async fn upsert_research(&self, research: NewResearch)
        -> Result<BrandResearchRecord, StoreError>;

    /// Clears the similar brands (and their emails) of a record, inserts the new set and
    /// sets the record's tailored email draft, all in one commit.
    async fn replace_enrichment(
        &self,
        research_id: Uuid,
        enrichment: ResearchEnrichment,
    ) -> Result<(), StoreError>;

    async fn insert_lead(&self, research_id: Uuid, lead: NewLead)
        -> Result<LeadEntry, StoreError>;

    async fn get_research(&self, id: Uuid) -> Result<Option<BrandResearchDetail>, StoreError>;

    async fn find_research_by_brand_name(
        &self,
        brand_name: &str,
    ) -> Result<Option<BrandResearchDetail>, StoreError>;

    async fn list_research(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<BrandResearchRecord>, StoreError>;

    /// Returns false when no record had that id. Child rows go with the record.
    async fn delete_research(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list_leads(&self) -> Result<Vec<LeadEntry>, StoreError>;

    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: &str,
    ) -> Result<Option<LeadEntry>, StoreError>;
}
