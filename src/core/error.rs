//! Typed error handling for the API
//!
//! # Error Categories
//!
//! - [`ApiError`]: per-request failures, rendered as `{"error": "..."}`
//! - [`StartupError`]: fatal failures before the server accepts traffic
//!
//! Validation problems are always client errors and never reach the
//! database. Database problems are logged server-side by the handler and
//! surface to the caller as a generic message only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error returned by request handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The body could not be deserialized into the expected record
    InvalidPayload(String),

    /// The record was well-formed but broke a field constraint
    Validation(String),

    /// The path id is not an integer
    InvalidId,

    /// The procedure call failed; `message` is safe to show to callers
    Database { message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidPayload(detail) => write!(f, "Invalid request payload: {}", detail),
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::InvalidId => write!(f, "Invalid ID format"),
            ApiError::Database { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    /// Database failure with a caller-facing message
    pub fn database(message: impl Into<String>) -> Self {
        ApiError::Database {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::Validation(_) | ApiError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Fatal errors raised while bringing the service up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("unable to parse database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("failed to create connection pool: {0}")]
    Pool(String),

    #[error("failed to ping database: {0}")]
    HealthCheck(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_return_400() {
        assert_eq!(
            ApiError::InvalidPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidId.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_error_returns_500() {
        let err = ApiError::database("Failed to insert product");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to insert product");
    }

    #[test]
    fn test_invalid_payload_message() {
        assert_eq!(
            ApiError::InvalidPayload("missing field `status`".into()).to_string(),
            "Invalid request payload: missing field `status`"
        );
    }

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ApiError::InvalidId.to_response()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid ID format" }));
    }

    #[test]
    fn test_startup_error_display() {
        let err = StartupError::HealthCheck("connection refused".into());
        assert_eq!(err.to_string(), "failed to ping database: connection refused");
    }
}
