//! Request and Response models for the cache pool API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{KeysRequest, SetRequest};
pub use responses::{
    BatchResponse, ClearResponse, CommitResponse, DeleteResponse, ErrorResponse, HealthResponse,
    ItemResponse, SetResponse,
};
