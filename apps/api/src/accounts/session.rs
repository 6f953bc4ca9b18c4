use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::tokens::Claims;

/// A verified `Authorization: Bearer <token>` header.
/// Add it to a handler's arguments to require a logged-in caller.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: Claims,
}

impl AuthSession {
    pub fn username(&self) -> Option<&str> {
        self.claims.get("sub").and_then(|v| v.as_str())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))?;

        let claims = state.tokens.verify(token)?;
        Ok(Self { claims })
    }
}
