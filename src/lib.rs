//! Cache Pool - An item-oriented cache with deferred writes
//!
//! Items carry their own expiration; a pool produces them, resolves batched
//! lookups against a pluggable repository and flushes deferred writes on
//! commit. An HTTP front-end serves a pool of JSON values.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{Item, Items, Lifetime, Pool, Ttl};
pub use config::Config;
pub use error::{CacheError, Result};
pub use repository::{Repository, SimpleRepository};
pub use tasks::spawn_commit_task;
