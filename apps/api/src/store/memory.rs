//! In-memory `CrmStore` for tests. Mirrors the schema's unique constraints and
//! `ON DELETE CASCADE` behaviour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::research::{
    BrandResearchDetail, BrandResearchRecord, EmailEntry, LeadEntry, SimilarBrandEntry,
};
use crate::models::user::UserAccount;
use crate::store::{
    CrmStore, NewLead, NewResearch, NewUser, ResearchEnrichment, StoreError,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserAccount>,
    research: Vec<BrandResearchRecord>,
    similar_brands: Vec<SimilarBrandEntry>,
    emails: Vec<EmailEntry>,
    leads: Vec<LeadEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_research_writes: AtomicBool,
}

/// Row counts per table, for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub users: usize,
    pub research: usize,
    pub similar_brands: usize,
    pub emails: usize,
    pub leads: usize,
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to the research tables fail as if the database were down.
    pub fn fail_research_writes(&self, fail: bool) {
        self.fail_research_writes.store(fail, Ordering::SeqCst);
    }

    pub fn counts(&self) -> RowCounts {
        let tables = self.tables.lock().unwrap();
        RowCounts {
            users: tables.users.len(),
            research: tables.research.len(),
            similar_brands: tables.similar_brands.len(),
            emails: tables.emails.len(),
            leads: tables.leads.len(),
        }
    }

    fn check_research_writes(&self) -> Result<(), StoreError> {
        if self.fail_research_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn detail(tables: &Tables, record: &BrandResearchRecord) -> BrandResearchDetail {
        let mut similar_brands: Vec<_> = tables
            .similar_brands
            .iter()
            .filter(|s| s.brand_research_id == record.id)
            .cloned()
            .collect();
        similar_brands.sort_by_key(|s| s.rank);

        let emails = similar_brands
            .iter()
            .filter_map(|s| tables.emails.iter().find(|e| e.similar_brand_id == s.id))
            .cloned()
            .collect();

        let leads = tables
            .leads
            .iter()
            .filter(|l| l.brand_research_id == record.id)
            .cloned()
            .collect();

        BrandResearchDetail {
            record: record.clone(),
            similar_brands,
            emails,
            leads,
        }
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let conflict = tables.users.iter().find_map(|u| {
            if u.username == user.username {
                Some("username")
            } else if u.email == user.email {
                Some("email")
            } else if u.phone == user.phone {
                Some("phone")
            } else {
                None
            }
        });
        if let Some(field) = conflict {
            return Err(StoreError::Conflict {
                field: field.to_string(),
            });
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(account.clone());
        Ok(account)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn upsert_research(
        &self,
        research: NewResearch,
    ) -> Result<BrandResearchRecord, StoreError> {
        self.check_research_writes()?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = tables
            .research
            .iter_mut()
            .find(|r| r.brand_name == research.brand_name)
        {
            existing.sender_company_info = research.sender_company_info;
            existing.outreach_goal = research.outreach_goal;
            existing.desired_cta = research.desired_cta;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let record = BrandResearchRecord {
            id: Uuid::new_v4(),
            brand_name: research.brand_name,
            sender_company_info: research.sender_company_info,
            outreach_goal: research.outreach_goal,
            desired_cta: research.desired_cta,
            industry_label: research.industry_label,
            tailored_email_draft: None,
            created_at: now,
            updated_at: now,
        };
        tables.research.push(record.clone());
        Ok(record)
    }

    async fn replace_enrichment(
        &self,
        research_id: Uuid,
        enrichment: ResearchEnrichment,
    ) -> Result<(), StoreError> {
        self.check_research_writes()?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();

        let Some(record) = tables.research.iter_mut().find(|r| r.id == research_id) else {
            return Err(StoreError::NotFound {
                entity: format!("brand research {research_id}"),
            });
        };
        record.tailored_email_draft = enrichment.tailored_email_draft;
        record.updated_at = now;

        tables
            .similar_brands
            .retain(|s| s.brand_research_id != research_id);
        tables.emails.retain(|e| e.brand_research_id != research_id);

        for (rank, brand) in enrichment.similar_brands.into_iter().enumerate() {
            let similar_brand_id = Uuid::new_v4();
            tables.similar_brands.push(SimilarBrandEntry {
                id: similar_brand_id,
                brand_research_id: research_id,
                rank: rank as i32,
                brand_name: brand.brand_name,
                domain: brand.domain,
                tailored_email: brand.tailored_email,
                created_at: now,
            });
            if let Some(email) = brand.email {
                tables.emails.push(EmailEntry {
                    id: Uuid::new_v4(),
                    brand_research_id: research_id,
                    similar_brand_id,
                    email_address: email.email_address,
                    status: email.status,
                    created_at: now,
                });
            }
        }
        Ok(())
    }

    async fn insert_lead(&self, research_id: Uuid, lead: NewLead) -> Result<LeadEntry, StoreError> {
        self.check_research_writes()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.research.iter().any(|r| r.id == research_id) {
            return Err(StoreError::NotFound {
                entity: format!("brand research {research_id}"),
            });
        }
        let now = Utc::now();
        let entry = LeadEntry {
            id: Uuid::new_v4(),
            brand_research_id: research_id,
            name: lead.name,
            company_name: lead.company_name,
            email: lead.email,
            position: lead.position,
            status: lead.status,
            created_at: now,
            updated_at: now,
        };
        tables.leads.push(entry.clone());
        Ok(entry)
    }

    async fn get_research(&self, id: Uuid) -> Result<Option<BrandResearchDetail>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .research
            .iter()
            .find(|r| r.id == id)
            .map(|r| Self::detail(&tables, r)))
    }

    async fn find_research_by_brand_name(
        &self,
        brand_name: &str,
    ) -> Result<Option<BrandResearchDetail>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .research
            .iter()
            .find(|r| r.brand_name == brand_name)
            .map(|r| Self::detail(&tables, r)))
    }

    async fn list_research(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<BrandResearchRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .research
            .iter()
            .rev()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn delete_research(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_research_writes()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.research.len();
        tables.research.retain(|r| r.id != id);
        if tables.research.len() == before {
            return Ok(false);
        }
        tables.similar_brands.retain(|s| s.brand_research_id != id);
        tables.emails.retain(|e| e.brand_research_id != id);
        tables.leads.retain(|l| l.brand_research_id != id);
        Ok(true)
    }

    async fn list_leads(&self) -> Result<Vec<LeadEntry>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.leads.clone())
    }

    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: &str,
    ) -> Result<Option<LeadEntry>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.leads.iter_mut().find(|l| l.id == lead_id).map(|lead| {
            lead.status = status.to_string();
            lead.updated_at = Utc::now();
            lead.clone()
        }))
    }
}
