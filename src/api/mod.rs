//! API Module
//!
//! HTTP handlers and routing for the cache pool REST API.
//!
//! # Endpoints
//! - `PUT /items` - Store an item now or defer it
//! - `GET /items/:key` - Look up one item
//! - `POST /items/batch` - Look up several items in request order
//! - `DELETE /items/:key` - Delete one item
//! - `POST /items/delete` - Delete several items
//! - `DELETE /items` - Clear the pool
//! - `POST /commit` - Flush deferred items
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
