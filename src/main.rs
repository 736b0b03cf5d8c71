//! Cache Pool server binary
//!
//! Serves a pool of JSON values over HTTP and flushes deferred writes in
//! the background.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_pool::{create_router, spawn_commit_task, AppState, Config};

/// Main entry point for the cache pool server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the pool over the configured backend
/// 4. Start background deferred commit task
/// 5. Serve the router until SIGINT/SIGTERM
/// 6. Stop the commit task and flush what is still deferred
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_pool=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Pool Server");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: storage={:?}, default_ttl={:?}, port={}, commit_interval={}s",
        config.storage, config.default_ttl, config.server_port, config.commit_interval
    );

    let state = AppState::from_config(&config).context("cannot initialize the pool")?;
    info!("Cache pool initialized");

    let commit_handle = spawn_commit_task(state.pool.clone(), config.commit_interval);
    info!("Background commit task started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    commit_handle.abort();
    warn!("Commit task aborted");

    let mut pool = state.pool.write().await;
    let pending = pool.deferred_len();
    if pool.commit() {
        info!("Flushed {} deferred items", pending);
    } else {
        error!("Final commit of {} deferred items was incomplete", pending);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
