use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub hunter_api_key: String,
    pub hunter_base_url: String,
    pub token_secret: String,
    pub token_algorithm: Algorithm,
    pub token_ttl_secs: u64,
    pub upstream_timeout_secs: u64,
    pub upstream_max_retries: u32,
    pub enrichment_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let enrichment_concurrency: usize = parse_env("ENRICHMENT_CONCURRENCY", 4)?;
        if enrichment_concurrency == 0 {
            bail!("ENRICHMENT_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            hunter_api_key: require_env("HUNTER_API_KEY")?,
            hunter_base_url: std::env::var("HUNTER_BASE_URL")
                .unwrap_or_else(|_| "https://api.hunter.io".to_string()),
            token_secret: require_env("TOKEN_SECRET")?,
            token_algorithm: parse_algorithm(
                &std::env::var("TOKEN_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            )?,
            token_ttl_secs: parse_env("TOKEN_TTL_SECS", 86_400)?,
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 30)?,
            upstream_max_retries: parse_env("UPSTREAM_MAX_RETRIES", 0)?,
            enrichment_concurrency,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Session tokens are signed with a shared secret, so only the HMAC family is accepted.
pub fn parse_algorithm(raw: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(raw.trim())
        .with_context(|| format!("TOKEN_ALGORITHM '{raw}' is not a known algorithm"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("TOKEN_ALGORITHM {other:?} is not a symmetric algorithm"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm_accepts_hmac_family() {
        assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm(" HS512 ").unwrap(), Algorithm::HS512);
    }

    #[test]
    fn test_parse_algorithm_rejects_asymmetric() {
        assert!(parse_algorithm("RS256").is_err());
    }

    #[test]
    fn test_parse_algorithm_rejects_garbage() {
        assert!(parse_algorithm("rot13").is_err());
    }
}
