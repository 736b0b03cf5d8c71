//! API Routes
//!
//! Configures the Axum router with all cache pool endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_handler, clear_handler, commit_handler, delete_handler, delete_many_handler,
    get_handler, health_handler, set_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", put(set_handler).delete(clear_handler))
        .route("/items/batch", post(batch_handler))
        .route("/items/delete", post(delete_many_handler))
        .route("/items/:key", get(get_handler).delete(delete_handler))
        .route("/commit", post(commit_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
