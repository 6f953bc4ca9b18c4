use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::session::AuthSession;
use crate::errors::AppError;
use crate::models::research::{BrandResearchDetail, BrandResearchRecord, LeadEntry};
use crate::research::{validate_lead, ResearchOutcome, ResearchRequest};
use crate::state::AppState;
use crate::store::NewLead;

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Clamps paging input to `skip >= 0` and `1 <= limit <= 100`.
pub fn normalize_page(query: &PageQuery) -> (i64, i64) {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    (skip, limit)
}

#[derive(Debug, Deserialize)]
pub struct BrandNameQuery {
    pub brand_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LeadStatusForm {
    pub lead_id: Uuid,
    pub new_status: String,
}

/// POST /api/v1/research
pub async fn handle_submit_research(
    State(state): State<AppState>,
    _session: AuthSession,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<ResearchOutcome>, AppError> {
    let outcome = state.orchestrator.run(req).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/research?skip=0&limit=10
pub async fn handle_list_research(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<BrandResearchRecord>>, AppError> {
    let (skip, limit) = normalize_page(&query);
    let records = state.store.list_research(skip, limit).await?;
    Ok(Json(records))
}

/// GET /api/v1/research/lookup?brand_name=
pub async fn handle_lookup_research(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(query): Query<BrandNameQuery>,
) -> Result<Json<BrandResearchDetail>, AppError> {
    let detail = state
        .store
        .find_research_by_brand_name(query.brand_name.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Research not found".to_string()))?;
    Ok(Json(detail))
}

/// GET /api/v1/research/:id
pub async fn handle_get_research(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<BrandResearchDetail>, AppError> {
    let detail = state
        .store
        .get_research(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Research not found".to_string()))?;
    Ok(Json(detail))
}

/// DELETE /api/v1/research/:id
pub async fn handle_delete_research(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_research(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Research not found".to_string()))
    }
}

/// POST /api/v1/research/:id/leads
pub async fn handle_create_lead(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(lead): Json<NewLead>,
) -> Result<(StatusCode, Json<LeadEntry>), AppError> {
    validate_lead(&lead)?;
    let entry = state.store.insert_lead(id, lead).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/leads
pub async fn handle_list_leads(
    State(state): State<AppState>,
    _session: AuthSession,
) -> Result<Json<Vec<LeadEntry>>, AppError> {
    Ok(Json(state.store.list_leads().await?))
}

/// POST /api/v1/leads/status
pub async fn handle_update_lead_status(
    State(state): State<AppState>,
    _session: AuthSession,
    Form(form): Form<LeadStatusForm>,
) -> Result<Json<LeadEntry>, AppError> {
    let status = form.new_status.trim();
    if status.is_empty() {
        return Err(AppError::Validation("new_status must not be empty".to_string()));
    }
    let lead = state
        .store
        .update_lead_status(form.lead_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;
    Ok(Json(lead))
}
