//! # Request Extractors
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//!  CurrentUser ── missing / malformed / bad signature / expired ──► 401
//!        │
//!        ├── username in token no longer exists ──────────────────► 404
//!        ▼
//!  AdminUser ─── role != ADMIN ──────────────────────────────────► 403
//! ```

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use emporium_core::User;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejections render as `{"error": ...}` with status 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))?;

        let claims = state.jwt.validate_token(token)?;

        let user = state
            .db
            .users()
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::not_found("User", &claims.sub))?;

        Ok(CurrentUser(user))
    }
}

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            tracing::warn!(username = %user.username, "Admin route denied");
            return Err(ApiError::forbidden("Admin role required"));
        }

        Ok(AdminUser(user))
    }
}
