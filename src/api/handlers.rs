//! API Handlers
//!
//! HTTP request handlers for each cache pool endpoint.

use std::fs;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{validate_key, Pool};
use crate::config::{Config, StorageKind};
use crate::error::{CacheError, Result};
use crate::models::{
    BatchResponse, ClearResponse, CommitResponse, DeleteResponse, HealthResponse, ItemResponse,
    KeysRequest, SetRequest, SetResponse,
};
use crate::repository::{
    FileRepository, MemoryRepository, Repository, Session, SessionRepository,
    SimpleRepositoryAdapter,
};

/// Backend type erased so the server can pick one at startup.
pub type BoxedRepository = Box<dyn Repository<Value> + Send + Sync>;

/// Pool of JSON values served by the API.
pub type ServerPool = Pool<Value, BoxedRepository>;

/// Application state shared across all handlers.
///
/// The pool itself is single-threaded, so it is wrapped in Arc<RwLock<>>.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache pool
    pub pool: Arc<RwLock<ServerPool>>,
}

impl AppState {
    /// Creates a new AppState with the given pool.
    pub fn new(pool: ServerPool) -> Self {
        Self {
            pool: Arc::new(RwLock::new(pool)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the configured backend and a pool with the configured default TTL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let repository: BoxedRepository = match config.storage {
            StorageKind::Memory => {
                Box::new(SimpleRepositoryAdapter::new(MemoryRepository::<Value>::new()))
            }
            StorageKind::File => {
                fs::create_dir_all(&config.cache_dir).map_err(|e| {
                    CacheError::BackendUnavailable(format!(
                        "cannot create {}: {}",
                        config.cache_dir.display(),
                        e
                    ))
                })?;
                let repository =
                    FileRepository::with_extension(&config.cache_dir, &config.cache_extension)?;
                info!("File storage in {}", repository.directory().display());
                Box::new(SimpleRepositoryAdapter::new(repository))
            }
            StorageKind::Session => {
                Box::new(SessionRepository::new(&Session::<Value>::started())?)
            }
        };

        let pool = Pool::with_default_ttl(repository, config.default_ttl)?;
        Ok(Self::new(pool))
    }
}

/// Handler for GET /items/:key
///
/// Returns the item for a key, hit or miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ItemResponse>> {
    let pool = state.pool.read().await;
    let item = pool.get_item(&key)?;

    Ok(Json(ItemResponse::from(&item)))
}

/// Handler for PUT /items
///
/// Stores a value now or queues it for the next commit.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    req.validate()?;

    let mut pool = state.pool.write().await;
    let mut item = pool.get_item(&req.key)?;
    match req.ttl {
        Some(ttl) => {
            item.set_with_ttl(req.value, ttl)?;
        }
        None => {
            item.set(req.value);
        }
    }

    if req.deferred {
        pool.save_deferred(item);
    } else {
        pool.save(&mut item);
    }

    Ok(Json(SetResponse::new(req.key, req.deferred)))
}

/// Handler for POST /items/batch
///
/// Returns one item per requested key, in request order.
pub async fn batch_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<BatchResponse>> {
    let pool = state.pool.read().await;
    let items = pool.get_items(&req.keys)?;

    Ok(Json(BatchResponse {
        items: items.iter().map(|(_, item)| ItemResponse::from(item)).collect(),
    }))
}

/// Handler for DELETE /items/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    validate_key(&key)?;

    let mut pool = state.pool.write().await;
    pool.delete_items(&[&key]);

    Ok(Json(DeleteResponse::new(vec![key])))
}

/// Handler for POST /items/delete
pub async fn delete_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<DeleteResponse>> {
    for key in &req.keys {
        validate_key(key)?;
    }

    let mut pool = state.pool.write().await;
    pool.delete_items(&req.keys);

    Ok(Json(DeleteResponse::new(req.keys)))
}

/// Handler for DELETE /items
///
/// Empties the backend and drops pending deferred writes.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut pool = state.pool.write().await;
    Json(ClearResponse {
        cleared: pool.clear(),
    })
}

/// Handler for POST /commit
///
/// Flushes deferred writes.
pub async fn commit_handler(State(state): State<AppState>) -> Json<CommitResponse> {
    let mut pool = state.pool.write().await;
    let flushed = pool.deferred_len();
    let committed = pool.commit();

    Json(CommitResponse { committed, flushed })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
