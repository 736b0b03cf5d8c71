//! Response DTOs for the cache pool API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::Item;

/// A single item (GET /items/:key and entries of POST /items/batch)
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    /// The requested key
    pub key: String,
    /// The stored value, null on a miss
    pub value: Option<Value>,
    /// Whether the item exists and has not expired
    pub hit: bool,
    /// Whether the item exists in the backend
    pub exists: bool,
    /// Expiration in RFC 3339 format
    pub expires_at: String,
}

impl From<&Item<Value>> for ItemResponse {
    fn from(item: &Item<Value>) -> Self {
        Self {
            key: item.key().to_string(),
            value: item.get().cloned(),
            hit: item.is_hit(),
            exists: item.exists(),
            expires_at: item.expiration().to_rfc3339(),
        }
    }
}

/// Response body for POST /items/batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// Items in request order
    pub items: Vec<ItemResponse>,
}

/// Response body for PUT /items
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether the write waits for the next commit
    pub deferred: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, deferred: bool) -> Self {
        let key = key.into();
        let message = if deferred {
            format!("Key '{}' queued for commit", key)
        } else {
            format!("Key '{}' saved successfully", key)
        };
        Self {
            message,
            key,
            deferred,
        }
    }
}

/// Response body for DELETE /items/:key and POST /items/delete
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The keys that were deleted
    pub keys: Vec<String>,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            message: format!("{} key(s) deleted", keys.len()),
            keys,
        }
    }
}

/// Response body for DELETE /items
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Whether the backend reported success
    pub cleared: bool,
}

/// Response body for POST /commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitResponse {
    /// Whether every deferred item was stored
    pub committed: bool,
    /// Number of deferred items flushed
    pub flushed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
