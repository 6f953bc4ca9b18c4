use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::research::{
    BrandResearchDetail, BrandResearchRecord, EmailEntry, LeadEntry, SimilarBrandEntry,
};
use crate::models::user::UserAccount;
use crate::store::{
    CrmStore, NewLead, NewResearch, NewUser, ResearchEnrichment, StoreError,
};

/// PostgreSQL-backed store. Uniqueness and cascades are enforced by the schema
/// in `migrations/`, not by read-before-write checks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_detail(
        &self,
        record: BrandResearchRecord,
    ) -> Result<BrandResearchDetail, StoreError> {
        let similar_brands = sqlx::query_as::<_, SimilarBrandEntry>(
            "SELECT * FROM similar_brands WHERE brand_research_id = $1 ORDER BY rank",
        )
        .bind(record.id)
        .fetch_all(&self.pool)
        .await?;

        let emails = sqlx::query_as::<_, EmailEntry>(
            r#"
            SELECT e.*
            FROM emails e
            JOIN similar_brands s ON s.id = e.similar_brand_id
            WHERE e.brand_research_id = $1
            ORDER BY s.rank
            "#,
        )
        .bind(record.id)
        .fetch_all(&self.pool)
        .await?;

        let leads = sqlx::query_as::<_, LeadEntry>(
            "SELECT * FROM leads WHERE brand_research_id = $1 ORDER BY created_at, id",
        )
        .bind(record.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(BrandResearchDetail {
            record,
            similar_brands,
            emails,
            leads,
        })
    }
}

/// Maps a unique-constraint name from the schema to the column it protects.
pub(crate) fn conflict_field(constraint: Option<&str>) -> &str {
    match constraint {
        Some("users_username_key") => "username",
        Some("users_email_key") => "email",
        Some("users_phone_key") => "phone",
        Some("brand_research_brand_name_key") => "brand_name",
        Some(other) => other,
        None => "record",
    }
}

fn map_write_error(err: sqlx::Error, parent: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict {
                field: conflict_field(db_err.constraint()).to_string(),
            };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound {
                entity: parent.to_string(),
            };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CrmStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        sqlx::query_as::<_, UserAccount>(
            r#"
            INSERT INTO users (id, first_name, last_name, username, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "user"))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserAccount>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_research(
        &self,
        research: NewResearch,
    ) -> Result<BrandResearchRecord, StoreError> {
        sqlx::query_as::<_, BrandResearchRecord>(
            r#"
            INSERT INTO brand_research
                (id, brand_name, sender_company_info, outreach_goal, desired_cta, industry_label)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (brand_name) DO UPDATE SET
                sender_company_info = EXCLUDED.sender_company_info,
                outreach_goal = EXCLUDED.outreach_goal,
                desired_cta = EXCLUDED.desired_cta,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&research.brand_name)
        .bind(&research.sender_company_info)
        .bind(&research.outreach_goal)
        .bind(&research.desired_cta)
        .bind(&research.industry_label)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "brand research"))
    }

    async fn replace_enrichment(
        &self,
        research_id: Uuid,
        enrichment: ResearchEnrichment,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM brand_research WHERE id = $1 FOR UPDATE")
                .bind(research_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound {
                entity: format!("brand research {research_id}"),
            });
        }

        // Emails cascade from their similar brand.
        sqlx::query("DELETE FROM similar_brands WHERE brand_research_id = $1")
            .bind(research_id)
            .execute(&mut *tx)
            .await?;

        for (rank, brand) in enrichment.similar_brands.iter().enumerate() {
            let similar_brand_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO similar_brands
                    (id, brand_research_id, rank, brand_name, domain, tailored_email)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(similar_brand_id)
            .bind(research_id)
            .bind(rank as i32)
            .bind(&brand.brand_name)
            .bind(&brand.domain)
            .bind(&brand.tailored_email)
            .execute(&mut *tx)
            .await?;

            if let Some(email) = &brand.email {
                sqlx::query(
                    r#"
                    INSERT INTO emails
                        (id, brand_research_id, similar_brand_id, email_address, status)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(research_id)
                .bind(similar_brand_id)
                .bind(&email.email_address)
                .bind(&email.status)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(
            "UPDATE brand_research SET tailored_email_draft = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(research_id)
        .bind(&enrichment.tailored_email_draft)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Replaced enrichment for research {research_id}: {} similar brands",
            enrichment.similar_brands.len()
        );
        Ok(())
    }

    async fn insert_lead(&self, research_id: Uuid, lead: NewLead) -> Result<LeadEntry, StoreError> {
        sqlx::query_as::<_, LeadEntry>(
            r#"
            INSERT INTO leads (id, brand_research_id, name, company_name, email, position, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(research_id)
        .bind(&lead.name)
        .bind(&lead.company_name)
        .bind(&lead.email)
        .bind(&lead.position)
        .bind(&lead.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("brand research {research_id}")))
    }

    async fn get_research(&self, id: Uuid) -> Result<Option<BrandResearchDetail>, StoreError> {
        let record =
            sqlx::query_as::<_, BrandResearchRecord>("SELECT * FROM brand_research WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match record {
            Some(record) => Ok(Some(self.load_detail(record).await?)),
            None => Ok(None),
        }
    }

    async fn find_research_by_brand_name(
        &self,
        brand_name: &str,
    ) -> Result<Option<BrandResearchDetail>, StoreError> {
        let record = sqlx::query_as::<_, BrandResearchRecord>(
            "SELECT * FROM brand_research WHERE brand_name = $1",
        )
        .bind(brand_name)
        .fetch_optional(&self.pool)
        .await?;
        match record {
            Some(record) => Ok(Some(self.load_detail(record).await?)),
            None => Ok(None),
        }
    }

    async fn list_research(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<BrandResearchRecord>, StoreError> {
        Ok(sqlx::query_as::<_, BrandResearchRecord>(
            "SELECT * FROM brand_research ORDER BY created_at DESC, id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_research(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM brand_research WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_leads(&self) -> Result<Vec<LeadEntry>, StoreError> {
        Ok(
            sqlx::query_as::<_, LeadEntry>("SELECT * FROM leads ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_lead_status(
        &self,
        lead_id: Uuid,
        status: &str,
    ) -> Result<Option<LeadEntry>, StoreError> {
        Ok(sqlx::query_as::<_, LeadEntry>(
            "UPDATE leads SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(lead_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }
}
