//! Account registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use emporium_core::validation::{validate_email, validate_password, validate_username};
use emporium_core::{Role, User};
use serde::Deserialize;
use tracing::info;

use crate::auth::hash_password_blocking;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// `POST /api/users/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = req.username.trim();
    let email = req.email.trim();

    validate_username(username)?;
    validate_password(&req.password)?;
    validate_email(email)?;

    let password_hash = hash_password_blocking(req.password).await?;
    let user = state
        .db
        .users()
        .create(username, email, &password_hash, Role::User)
        .await?;

    info!(username = %user.username, "Registration complete");
    Ok((StatusCode::CREATED, Json(user)))
}
