use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Anchor row for one brand's outreach research.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BrandResearchRecord {
    pub id: Uuid,
    pub brand_name: String,
    pub sender_company_info: String,
    pub outreach_goal: String,
    pub desired_cta: String,
    /// Set once when the record is first created; never empty, no trailing period.
    pub industry_label: String,
    pub tailored_email_draft: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SimilarBrandEntry {
    pub id: Uuid,
    pub brand_research_id: Uuid,
    /// Position in the similar-brands answer, starting at 0.
    pub rank: i32,
    pub brand_name: String,
    pub domain: String,
    pub tailored_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A discovered contact address. Belongs to the similar brand whose domain produced it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailEntry {
    pub id: Uuid,
    pub brand_research_id: Uuid,
    pub similar_brand_id: Uuid,
    pub email_address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadEntry {
    pub id: Uuid,
    pub brand_research_id: Uuid,
    pub name: String,
    pub company_name: String,
    pub email: String,
    /// Job title or role.
    pub position: Option<String>,
    /// Free-form, e.g. "contacted", "not contacted".
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A research record together with its three child collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandResearchDetail {
    #[serde(flatten)]
    pub record: BrandResearchRecord,
    pub similar_brands: Vec<SimilarBrandEntry>,
    pub emails: Vec<EmailEntry>,
    pub leads: Vec<LeadEntry>,
}
