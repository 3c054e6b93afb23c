//! Error types for sbo-identity API handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Cross-tenant access (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409) - uniqueness invariant violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// sbo-common error
    #[error("{0}")]
    Common(#[from] sbo_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Unwrap common errors into their HTTP-mapped form first
        let error = match self {
            ApiError::Common(common) => match common {
                sbo_common::Error::InvalidArgument(msg) => ApiError::BadRequest(msg),
                sbo_common::Error::NotFound(msg) => ApiError::NotFound(msg),
                sbo_common::Error::Forbidden(msg) => ApiError::Forbidden(msg),
                sbo_common::Error::Conflict(msg) => ApiError::Conflict(msg),
                other => ApiError::Internal(other.to_string()),
            },
            other => other,
        };

        let (status, error_code, message) = match error {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(_) => unreachable!("unwrapped above"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
