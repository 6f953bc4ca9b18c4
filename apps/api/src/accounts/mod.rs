//! User accounts: signup, login and the bearer-token session extractor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::UserAccount;
use crate::store::{CrmStore, NewUser};
use crate::tokens::{Claims, TokenIssuer};

pub mod handlers;
pub mod password;
pub mod session;

/// `project` claim stamped on every session token.
pub const TOKEN_PROJECT: &str = "Hustler_AI";

const MAX_PHONE_LEN: usize = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    pub re_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Checks a signup form before anything touches the store.
pub fn validate_signup(form: &SignupForm) -> Result<(), AppError> {
    let required = [
        ("first_name", &form.first_name),
        ("last_name", &form.last_name),
        ("email", &form.email),
        ("phone", &form.phone),
        ("username", &form.username),
        ("password", &form.password),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} cannot be empty")));
        }
    }
    if form.password != form.re_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    if !form.email.contains('@') {
        return Err(AppError::Validation("email is not a valid address".to_string()));
    }
    if form.phone.trim().chars().count() > MAX_PHONE_LEN {
        return Err(AppError::Validation(format!(
            "phone must be at most {MAX_PHONE_LEN} characters"
        )));
    }
    Ok(())
}

/// Creates an account. Duplicate username, email or phone surfaces as `AppError::Conflict`
/// straight from the store's unique constraints.
pub async fn signup(store: &dyn CrmStore, form: SignupForm) -> Result<UserAccount, AppError> {
    validate_signup(&form)?;

    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let user = store
        .insert_user(NewUser {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password_hash,
        })
        .await?;

    info!("Created user {} ({})", user.username, user.id);
    Ok(user)
}

/// Verifies credentials and issues a session token.
pub async fn login(
    store: &dyn CrmStore,
    tokens: &TokenIssuer,
    form: LoginForm,
) -> Result<LoginResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = store
        .find_user_by_username(form.username.trim())
        .await?
        .ok_or_else(invalid)?;

    let stored = user.password_hash.clone();
    let password = form.password;
    let verified =
        tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("password check task failed: {e}")))?;
    if !verified {
        return Err(invalid());
    }

    let token = tokens.issue(session_claims(&user))?;
    info!("User {} logged in", user.username);

    Ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.ttl_secs(),
    })
}

fn session_claims(user: &UserAccount) -> Claims {
    let mut claims = Claims::new();
    claims.insert("sub".to_string(), Value::from(user.username.clone()));
    claims.insert("email".to_string(), Value::from(user.email.clone()));
    claims.insert("project".to_string(), Value::from(TOKEN_PROJECT));
    claims
}
