use axum::{extract::State, http::StatusCode, Form, Json};

use crate::accounts::session::AuthSession;
use crate::accounts::{login, signup, LoginForm, LoginResponse, SignupForm};
use crate::errors::AppError;
use crate::models::user::UserAccount;
use crate::state::AppState;

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<(StatusCode, Json<UserAccount>), AppError> {
    let user = signup(state.store.as_ref(), form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = login(state.store.as_ref(), &state.tokens, form).await?;
    Ok(Json(response))
}

/// GET /api/v1/users/me
pub async fn handle_me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<UserAccount>, AppError> {
    let username = session
        .username()
        .ok_or(AppError::InvalidToken)?;

    let user = state
        .store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
