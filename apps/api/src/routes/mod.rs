pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::research::handlers as research;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/signup", post(accounts::handle_signup))
        .route("/api/v1/auth/login", post(accounts::handle_login))
        .route("/api/v1/users/me", get(accounts::handle_me))
        // Research
        .route(
            "/api/v1/research",
            post(research::handle_submit_research).get(research::handle_list_research),
        )
        .route(
            "/api/v1/research/lookup",
            get(research::handle_lookup_research),
        )
        .route(
            "/api/v1/research/:id",
            get(research::handle_get_research).delete(research::handle_delete_research),
        )
        .route(
            "/api/v1/research/:id/leads",
            post(research::handle_create_lead),
        )
        // Leads (CRM dashboard)
        .route("/api/v1/leads", get(research::handle_list_leads))
        .route(
            "/api/v1/leads/status",
            post(research::handle_update_lead_status),
        )
        .with_state(state)
}
