//! Research orchestration: classify → anchor row → similar brands →
//! per-brand email discovery and drafting → replace children → leads → reload.
//!
//! Classification and the anchor-row write are fatal. Everything after the anchor
//! row degrades per item: failures are logged, reported as `EnrichmentIssue`s and
//! the remaining data is still persisted. The anchor row is never rolled back.

use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::{info, warn};

use crate::enrichment::{
    derive_domain, normalize_industry_label, DiscoveredEmail, Enrichment, EnrichmentError,
    MAX_SIMILAR_BRANDS,
};
use crate::errors::AppError;
use crate::research::{
    EnrichmentIssue, EnrichmentStage, ResearchOutcome, ResearchRequest,
};
use crate::store::{CrmStore, NewEmail, NewResearch, ResearchEnrichment, SimilarBrandDraft};

/// Everything gathered for one similar brand before persisting.
struct BrandOutcome {
    index: usize,
    name: String,
    domain: String,
    email: Result<Option<DiscoveredEmail>, EnrichmentError>,
    draft: Result<Option<String>, EnrichmentError>,
}

pub struct ResearchOrchestrator {
    store: Arc<dyn CrmStore>,
    enrichment: Arc<dyn Enrichment>,
    concurrency: usize,
}

impl ResearchOrchestrator {
    /// `concurrency` caps how many similar brands are enriched at once.
    pub fn new(store: Arc<dyn CrmStore>, enrichment: Arc<dyn Enrichment>, concurrency: usize) -> Self {
        Self {
            store,
            enrichment,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, request: ResearchRequest) -> Result<ResearchOutcome, AppError> {
        let request = request.validate()?;
        let brand_name = request.brand_name.as_str();
        let mut issues = Vec::new();

        // 1. Classify. Nothing is written if this fails.
        let raw_label = self
            .enrichment
            .classify_industry(brand_name)
            .await
            .map_err(|e| match e {
                EnrichmentError::Unavailable(msg) => AppError::UpstreamUnavailable(msg),
                other => AppError::ClassificationFailed(other.to_string()),
            })?;
        let industry_label = normalize_industry_label(&raw_label).ok_or_else(|| {
            AppError::ClassificationFailed(format!("empty industry label for '{brand_name}'"))
        })?;
        info!("Classified '{brand_name}' as '{industry_label}'");

        // 2. Anchor row.
        let record = self
            .store
            .upsert_research(NewResearch {
                brand_name: request.brand_name.clone(),
                sender_company_info: request.sender_company_info.clone(),
                outreach_goal: request.outreach_goal.clone(),
                desired_cta: request.desired_cta.clone(),
                industry_label,
            })
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;

        // 3. Similar brands. A failed call leaves the set empty.
        let similar = match self.enrichment.list_similar_brands(brand_name).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Similar brand lookup failed for '{brand_name}': {e}");
                issues.push(EnrichmentIssue {
                    stage: EnrichmentStage::SimilarBrands,
                    brand: None,
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        // 4. Per-brand fan-out.
        let mut outcomes = self
            .enrich_similar_brands(&request, similar.into_iter().take(MAX_SIMILAR_BRANDS))
            .await;
        outcomes.sort_by_key(|o| o.index);

        let mut enrichment = ResearchEnrichment::default();
        for outcome in outcomes {
            let email = match outcome.email {
                Ok(found) => found.map(|e| NewEmail {
                    email_address: e.address,
                    status: e.status,
                }),
                Err(e) => {
                    warn!("Email discovery failed for {}: {e}", outcome.domain);
                    issues.push(EnrichmentIssue {
                        stage: EnrichmentStage::EmailDiscovery,
                        brand: Some(outcome.name.clone()),
                        message: e.to_string(),
                    });
                    None
                }
            };
            let tailored_email = match outcome.draft {
                Ok(draft) => draft,
                Err(e) => {
                    warn!("Email draft failed for '{}': {e}", outcome.name);
                    issues.push(EnrichmentIssue {
                        stage: EnrichmentStage::EmailDraft,
                        brand: Some(outcome.name.clone()),
                        message: e.to_string(),
                    });
                    None
                }
            };
            if tailored_email.is_some() {
                enrichment.tailored_email_draft = tailored_email.clone();
            }
            enrichment.similar_brands.push(SimilarBrandDraft {
                brand_name: outcome.name,
                domain: outcome.domain,
                tailored_email,
                email,
            });
        }

        // 5. Replace children in one commit, then append leads.
        let brand_count = enrichment.similar_brands.len();
        self.store
            .replace_enrichment(record.id, enrichment)
            .await
            .map_err(|e| AppError::PersistenceFailed(e.to_string()))?;

        for lead in request.leads {
            let email = lead.email.clone();
            if let Err(e) = self.store.insert_lead(record.id, lead).await {
                warn!("Could not attach lead {email} to research {}: {e}", record.id);
                issues.push(EnrichmentIssue {
                    stage: EnrichmentStage::Lead,
                    brand: None,
                    message: format!("{email}: {e}"),
                });
            }
        }

        info!(
            "Research {} for '{}' stored: {brand_count} similar brands, {} issues",
            record.id,
            record.brand_name,
            issues.len()
        );

        // 6. Reload.
        let research = self
            .store
            .get_research(record.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Research {} not found", record.id)))?;

        Ok(ResearchOutcome {
            research,
            degraded: !issues.is_empty(),
            issues,
        })
    }

    /// Runs discovery and drafting for each brand, at most `concurrency` brands at a time.
    /// Completion order is arbitrary; each outcome carries its list index.
    async fn enrich_similar_brands(
        &self,
        request: &ResearchRequest,
        names: impl Iterator<Item = String>,
    ) -> Vec<BrandOutcome> {
        let enrichment = self.enrichment.as_ref();
        stream::iter(names.enumerate())
            .map(|(index, name)| async move {
                let domain = derive_domain(&name);
                let (email, draft) = futures::join!(
                    enrichment.discover_email(&domain),
                    enrichment.draft_outreach_email(
                        &request.sender_company_info,
                        &name,
                        &request.outreach_goal,
                        &request.desired_cta,
                    ),
                );
                BrandOutcome {
                    index,
                    name,
                    domain,
                    email,
                    draft,
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}
