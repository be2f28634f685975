//! Error types for the hash cache
//!
//! Provides unified error handling using thiserror. Store-communication
//! failures (`StoreError`) never leave the gateway; `HashCacheError` is what
//! callers of the facade and the HTTP layer see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failure talking to the backing hash store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis protocol or connection error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Connection could not be checked out of the pool
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Backend unreachable for any other reason
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Hash Cache Error Enum ==
/// Unified error type for caller-facing operations.
#[derive(Error, Debug)]
pub enum HashCacheError {
    /// `force` was requested without a recomputation block
    #[error("Missing recomputation block: force requires a block to compute the value")]
    MissingRecomputeBlock,

    /// Value could not be converted to or from its JSON form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Expiration lands outside the representable time range
    #[error("Expiration out of range: {0}")]
    ExpiryOutOfRange(String),

    /// Field not found in the group
    #[error("Field not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for HashCacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            HashCacheError::NotFound(_) => StatusCode::NOT_FOUND,
            HashCacheError::InvalidRequest(_)
            | HashCacheError::MissingRecomputeBlock
            | HashCacheError::ExpiryOutOfRange(_)
            | HashCacheError::Serialization(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for the hash cache.
pub type Result<T> = std::result::Result<T, HashCacheError>;

/// Result type returned by store backends.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
