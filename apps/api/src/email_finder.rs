//! Hunter.io domain-search client: resolves a domain to candidate contact addresses.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EmailFinderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl EmailFinderError {
    pub fn is_unavailable(&self) -> bool {
        match self {
            EmailFinderError::Http(e) => !e.is_decode(),
            EmailFinderError::Api { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// One address record as returned by domain-search. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailCandidate {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DomainSearchResponse {
    #[serde(default)]
    data: Option<DomainSearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct DomainSearchData {
    #[serde(default)]
    emails: Vec<EmailCandidate>,
}

#[derive(Clone)]
pub struct EmailFinderClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl EmailFinderClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, EmailFinderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns every candidate for `domain`, in upstream order.
    /// A success response that does not parse as a domain-search payload yields no candidates.
    pub async fn domain_search(&self, domain: &str) -> Result<Vec<EmailCandidate>, EmailFinderError> {
        let response = self
            .client
            .get(format!("{}/v2/domain-search", self.base_url))
            .query(&[("domain", domain), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EmailFinderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: DomainSearchResponse = serde_json::from_str(&body).unwrap_or_default();
        let emails = parsed.data.map(|d| d.emails).unwrap_or_default();
        debug!("domain-search for {domain} returned {} candidates", emails.len());
        Ok(emails)
    }
}
