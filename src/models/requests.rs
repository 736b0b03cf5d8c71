//! Request DTOs for the cache pool API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::validate_key;
use crate::error::Result;

/// Request body for storing an item (PUT /items)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds, negative values store an expired item
/// - `deferred`: Queue the write until the next commit instead of storing it
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds (uses the pool default if not specified)
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Defer the write to the next commit
    #[serde(default)]
    pub deferred: bool,
}

impl SetRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.key)
    }
}

/// Request body for multi-key operations (POST /items/batch, POST /items/delete)
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    /// Keys to operate on, in order
    pub keys: Vec<String>,
}
