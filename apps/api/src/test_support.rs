//! Shared fixtures for unit tests: a scripted `Enrichment` and an in-memory `AppState`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::enrichment::{parse_similar_brands, DiscoveredEmail, Enrichment, EnrichmentError};
use crate::research::ResearchOrchestrator;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::tokens::TokenIssuer;

pub const TEST_TOKEN_SECRET: &str = "test-secret";

/// Answers every capability from canned values. Defaults to the Nike scenario:
/// industry `"Apparel."`, similar brands `"Adidas, Puma, Reebok"`, no emails.
pub struct ScriptedEnrichment {
    industry: Mutex<Result<String, EnrichmentError>>,
    similar: Mutex<Result<String, EnrichmentError>>,
    emails: Mutex<HashMap<String, Result<Option<DiscoveredEmail>, EnrichmentError>>>,
    failing_drafts: Mutex<HashSet<String>>,
}

impl ScriptedEnrichment {
    pub fn new() -> Self {
        Self {
            industry: Mutex::new(Ok("Apparel.".to_string())),
            similar: Mutex::new(Ok("Adidas, Puma, Reebok".to_string())),
            emails: Mutex::new(HashMap::new()),
            failing_drafts: Mutex::new(HashSet::new()),
        }
    }

    pub fn set_industry(&self, answer: Result<String, EnrichmentError>) {
        *self.industry.lock().unwrap() = answer;
    }

    /// Raw comma-separated answer, parsed the same way the live client parses it.
    pub fn set_similar(&self, answer: Result<String, EnrichmentError>) {
        *self.similar.lock().unwrap() = answer;
    }

    /// Domains without an entry find no email.
    pub fn set_email(&self, domain: &str, result: Result<Option<DiscoveredEmail>, EnrichmentError>) {
        self.emails
            .lock()
            .unwrap()
            .insert(domain.to_string(), result);
    }

    pub fn fail_draft_for(&self, brand: &str) {
        self.failing_drafts.lock().unwrap().insert(brand.to_string());
    }
}

#[async_trait]
impl Enrichment for ScriptedEnrichment {
    async fn classify_industry(&self, _brand_name: &str) -> Result<String, EnrichmentError> {
        self.industry.lock().unwrap().clone()
    }

    async fn list_similar_brands(&self, _brand_name: &str) -> Result<Vec<String>, EnrichmentError> {
        self.similar
            .lock()
            .unwrap()
            .as_ref()
            .map(|text| parse_similar_brands(text))
            .map_err(Clone::clone)
    }

    async fn discover_email(
        &self,
        domain: &str,
    ) -> Result<Option<DiscoveredEmail>, EnrichmentError> {
        self.emails
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn draft_outreach_email(
        &self,
        sender_info: &str,
        recipient_brand: &str,
        outreach_goal: &str,
        desired_cta: &str,
    ) -> Result<Option<String>, EnrichmentError> {
        if self.failing_drafts.lock().unwrap().contains(recipient_brand) {
            return Err(EnrichmentError::Rejected(format!(
                "draft refused for {recipient_brand}"
            )));
        }
        Ok(Some(format!(
            "Hi {recipient_brand}, {sender_info} would like to talk about {outreach_goal}. {desired_cta}?"
        )))
    }
}

pub fn test_tokens() -> TokenIssuer {
    TokenIssuer::new(TEST_TOKEN_SECRET, jsonwebtoken::Algorithm::HS256, 3600)
}

pub fn test_state(store: Arc<MemoryStore>, enrichment: Arc<ScriptedEnrichment>) -> AppState {
    let orchestrator = ResearchOrchestrator::new(store.clone(), enrichment, 2);
    AppState {
        store,
        orchestrator: Arc::new(orchestrator),
        tokens: test_tokens(),
    }
}
