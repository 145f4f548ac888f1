//! Login.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::check_password;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// `POST /api/auth/login`
///
/// Unknown usernames and wrong passwords get the same 401, and both run
/// one argon2 verification.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim();

    let credentials = state.db.users().find_credentials(username).await?;
    let stored_hash = credentials.as_ref().map(|c| c.password_hash.clone());
    let password_ok = check_password(req.password, stored_hash).await?;

    let Some(credentials) = credentials else {
        warn!(username = %username, "Login for unknown user");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !password_ok {
        warn!(username = %username, "Login with wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.jwt.generate_token(&credentials.user)?;
    info!(username = %username, "Login successful");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.lifetime_secs(),
    }))
}
