use std::sync::Arc;

use crate::research::ResearchOrchestrator;
use crate::store::CrmStore;
use crate::tokens::TokenIssuer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Store behind every read and write. `PgStore` in production.
    pub store: Arc<dyn CrmStore>,
    pub orchestrator: Arc<ResearchOrchestrator>,
    pub tokens: TokenIssuer,
}
