//! Enrichment capabilities: the four outbound lookups the research flow depends on.
//!
//! `Enrichment` is the seam between the orchestrator and the outside world.
//! `LiveEnrichment` backs it with the LLM client and the Hunter.io client;
//! tests swap in a scripted implementation.
//!
//! Every capability is a single request/response. Malformed or empty upstream
//! answers come back as "no result"; only transport and API failures are errors.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::email_finder::{EmailFinderClient, EmailFinderError};
use crate::llm_client::prompts::{COMPANY_ANALYST_SYSTEM, EMAIL_WRITER_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

pub mod prompts;

use prompts::{
    INDUSTRY_PROMPT_TEMPLATE, OUTREACH_EMAIL_PROMPT_TEMPLATE, SIMILAR_BRANDS_PROMPT_TEMPLATE,
};

/// Upper bound on similar brands kept from one answer.
pub const MAX_SIMILAR_BRANDS: usize = 5;

/// Status stored for an address whose upstream record carries no verification status.
pub const DEFAULT_EMAIL_STATUS: &str = "active";

#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    /// Network failure, timeout, 429 or 5xx.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    #[error("upstream returned no usable content")]
    Empty,
}

impl From<LlmError> for EnrichmentError {
    fn from(err: LlmError) -> Self {
        if matches!(err, LlmError::EmptyContent) {
            EnrichmentError::Empty
        } else if err.is_unavailable() {
            EnrichmentError::Unavailable(err.to_string())
        } else {
            EnrichmentError::Rejected(err.to_string())
        }
    }
}

impl From<EmailFinderError> for EnrichmentError {
    fn from(err: EmailFinderError) -> Self {
        if err.is_unavailable() {
            EnrichmentError::Unavailable(err.to_string())
        } else {
            EnrichmentError::Rejected(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredEmail {
    pub address: String,
    pub status: String,
}

#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Raw one-word industry answer. Empty answers are an error here, unlike the other capabilities.
    async fn classify_industry(&self, brand_name: &str) -> Result<String, EnrichmentError>;

    /// At most `MAX_SIMILAR_BRANDS` names.
    async fn list_similar_brands(&self, brand_name: &str) -> Result<Vec<String>, EnrichmentError>;

    /// First address found for `domain`, if any.
    async fn discover_email(&self, domain: &str)
        -> Result<Option<DiscoveredEmail>, EnrichmentError>;

    async fn draft_outreach_email(
        &self,
        sender_info: &str,
        recipient_brand: &str,
        outreach_goal: &str,
        desired_cta: &str,
    ) -> Result<Option<String>, EnrichmentError>;
}

/// Production enrichment over OpenAI and Hunter.io.
#[derive(Clone)]
pub struct LiveEnrichment {
    llm: LlmClient,
    email_finder: EmailFinderClient,
}

impl LiveEnrichment {
    pub fn new(llm: LlmClient, email_finder: EmailFinderClient) -> Self {
        Self { llm, email_finder }
    }
}

/// Treats an empty or undecodable LLM answer as "no result" for the soft capabilities.
fn soft<T>(result: Result<T, LlmError>) -> Result<Option<T>, EnrichmentError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LlmError::EmptyContent) => Ok(None),
        Err(LlmError::Http(e)) if e.is_decode() => {
            warn!("Discarding malformed LLM response: {e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Substitutes `{key}` placeholders in one pass over `template`, so text inside
/// a substituted value is never treated as a placeholder.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = values
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[async_trait]
impl Enrichment for LiveEnrichment {
    async fn classify_industry(&self, brand_name: &str) -> Result<String, EnrichmentError> {
        let prompt = fill_template(INDUSTRY_PROMPT_TEMPLATE, &[("brand_name", brand_name)]);
        Ok(self.llm.call_text(&prompt, COMPANY_ANALYST_SYSTEM).await?)
    }

    async fn list_similar_brands(&self, brand_name: &str) -> Result<Vec<String>, EnrichmentError> {
        let prompt = fill_template(SIMILAR_BRANDS_PROMPT_TEMPLATE, &[("brand_name", brand_name)]);
        let answer = soft(self.llm.call_text(&prompt, COMPANY_ANALYST_SYSTEM).await)?;
        Ok(answer
            .map(|text| parse_similar_brands(&text))
            .unwrap_or_default())
    }

    async fn discover_email(
        &self,
        domain: &str,
    ) -> Result<Option<DiscoveredEmail>, EnrichmentError> {
        let candidates = self.email_finder.domain_search(domain).await?;
        Ok(candidates.into_iter().next().and_then(|first| {
            let address = first.value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
            let status = first
                .verification
                .and_then(|v| v.status)
                .unwrap_or_else(|| DEFAULT_EMAIL_STATUS.to_string());
            Some(DiscoveredEmail { address, status })
        }))
    }

    async fn draft_outreach_email(
        &self,
        sender_info: &str,
        recipient_brand: &str,
        outreach_goal: &str,
        desired_cta: &str,
    ) -> Result<Option<String>, EnrichmentError> {
        let prompt = fill_template(
            OUTREACH_EMAIL_PROMPT_TEMPLATE,
            &[
                ("sender_info", sender_info),
                ("recipient_brand", recipient_brand),
                ("outreach_goal", outreach_goal),
                ("desired_cta", desired_cta),
            ],
        );
        soft(self.llm.call_text(&prompt, EMAIL_WRITER_SYSTEM).await)
    }
}

/// Trims the answer and drops every trailing period. `None` if nothing is left.
pub fn normalize_industry_label(raw: &str) -> Option<String> {
    let label = raw.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    (!label.is_empty()).then(|| label.to_string())
}

/// Splits a comma-separated answer into at most `MAX_SIMILAR_BRANDS` names.
pub fn parse_similar_brands(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| {
            let item = item.trim();
            item.strip_suffix('.').unwrap_or(item).trim().to_string()
        })
        .filter(|item| !item.is_empty())
        .take(MAX_SIMILAR_BRANDS)
        .collect()
}

/// `www.` + lowercased name with spaces removed + `.com`.
pub fn derive_domain(brand_name: &str) -> String {
    format!("www.{}.com", brand_name.to_lowercase().replace(' ', ""))
}
