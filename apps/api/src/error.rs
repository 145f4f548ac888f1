//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Emporium                               │
//! │                                                                         │
//! │  Handler → Result<Json<T>, ApiError>                                    │
//! │         │                                                               │
//! │         ├── DbError::NotFound ─────────────────► 404                    │
//! │         ├── DbError::UniqueViolation ──────────► 409                    │
//! │         ├── CoreError / ValidationError ───────► 400                    │
//! │         ├── bad or missing bearer token ───────► 401                    │
//! │         ├── non-admin on admin route ──────────► 403                    │
//! │         └── anything else ─────────────────────► 500 (detail logged)    │
//! │                                                                         │
//! │  Body: {"error": "<message>"}                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use emporium_core::{CoreError, ValidationError};
use emporium_db::DbError;
use serde_json::json;

/// API error returned from handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Machine-readable error class; decides the status code
    pub code: ErrorCode,

    /// Human-readable error message, sent to the client
    pub message: String,
}

/// Error classes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Business rule rejected the request, e.g. empty cart (400)
    BusinessRule,

    /// Duplicate resource (409)
    Conflict,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Database unreachable (503)
    Unavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::BusinessRule => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates an internal error. The detail is logged, never sent.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message }))).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rejected(core) => ApiError::from(core),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::Unavailable, "Database unavailable")
            }
            DbError::PoolExhausted => {
                tracing::warn!("Database pool exhausted");
                ApiError::new(ErrorCode::Unavailable, "Database busy, try again")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            other @ (DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::Internal(_)) => ApiError::internal(other),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::EmptyCart
            | CoreError::InsufficientStock { .. }
            | CoreError::Overflow { .. } => {
                ApiError::new(ErrorCode::BusinessRule, err.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_status_mapping() {
        let cases = [
            (DbError::not_found("Product", "p1"), StatusCode::NOT_FOUND),
            (DbError::duplicate("username", "alice"), StatusCode::CONFLICT),
            (DbError::from(CoreError::EmptyCart), StatusCode::BAD_REQUEST),
            (DbError::from(CoreError::overflow("cart total")), StatusCode::BAD_REQUEST),
            (DbError::QueryFailed("disk I/O".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DbError::PoolExhausted, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::from(DbError::QueryFailed("no such table: carts".into()));
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = ApiError::from(DbError::from(CoreError::InsufficientStock {
            product: "Widget".into(),
            requested: 10,
            available: 3,
        }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            "Insufficient stock for product: Widget. Requested: 10, Available: 3"
        );
    }

    #[tokio::test]
    async fn test_body_shape() {
        let response = ApiError::not_found("User", "ghost").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": "User not found: ghost" }));
    }
}
