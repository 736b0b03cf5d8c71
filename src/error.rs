//! Error types for the cache pool
//!
//! Provides unified error handling using thiserror. Storage failures are not
//! errors: backends report them as booleans so callers can treat a failed
//! cache write as non-fatal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or contains a reserved character
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A TTL, expiration or configuration value has the wrong shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A storage backend precondition is not met
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache pool.
pub type Result<T> = std::result::Result<T, CacheError>;
