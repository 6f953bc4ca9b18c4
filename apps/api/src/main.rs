mod accounts;
mod config;
mod db;
mod email_finder;
mod enrichment;
mod errors;
mod llm_client;
mod models;
mod research;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod tokens;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::email_finder::EmailFinderClient;
use crate::enrichment::LiveEnrichment;
use crate::llm_client::LlmClient;
use crate::research::ResearchOrchestrator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;
use crate::tokens::TokenIssuer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hustler API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize outbound clients
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.upstream_timeout(),
        config.upstream_max_retries,
    )
    .map_err(|e| anyhow::anyhow!("failed to build LLM client: {e}"))?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let email_finder = EmailFinderClient::new(
        config.hunter_api_key.clone(),
        config.hunter_base_url.clone(),
        config.upstream_timeout(),
    )
    .map_err(|e| anyhow::anyhow!("failed to build email finder client: {e}"))?;
    info!(
        "Upstream timeout {}s, max retries {}",
        config.upstream_timeout_secs, config.upstream_max_retries
    );

    let enrichment = Arc::new(LiveEnrichment::new(llm, email_finder));
    let orchestrator = ResearchOrchestrator::new(
        store.clone(),
        enrichment,
        config.enrichment_concurrency,
    );
    info!(
        "Research orchestrator ready (concurrency: {})",
        config.enrichment_concurrency
    );

    let tokens = TokenIssuer::new(
        &config.token_secret,
        config.token_algorithm,
        config.token_ttl_secs,
    );

    // Build app state
    let state = AppState {
        store,
        orchestrator: Arc::new(orchestrator),
        tokens,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
