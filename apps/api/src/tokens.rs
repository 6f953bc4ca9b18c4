//! Session tokens: HMAC-signed JWTs carrying a free-form claim map.
//!
//! Every issued token carries `iat` and `exp`; `verify` rejects tokens without
//! a valid, unexpired `exp`.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

pub type Claims = Map<String, Value>;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed token, wrong algorithm or expired.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm, ttl_secs: u64) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Signs `claims`. `iat`/`exp` are filled in unless the caller already set them.
    pub fn issue(&self, mut claims: Claims) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        claims.entry("iat").or_insert_with(|| Value::from(now));
        claims
            .entry("exp")
            .or_insert_with(|| Value::from(now + self.ttl_secs as i64));

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
