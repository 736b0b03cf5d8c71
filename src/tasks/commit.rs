//! Deferred Commit Task
//!
//! Background task that periodically flushes items saved with `save_deferred`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ServerPool;

/// Spawns a background task that periodically commits the pool.
///
/// The write lock is only taken when something is deferred. An interval
/// of 0 is treated as 1 second. The returned handle should be aborted
/// during shutdown, before the final commit.
///
/// # Example
/// ```ignore
/// let handle = spawn_commit_task(state.pool.clone(), 5);
/// // Later, during shutdown:
/// handle.abort();
/// state.pool.write().await.commit();
/// ```
pub fn spawn_commit_task(
    pool: Arc<RwLock<ServerPool>>,
    commit_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(commit_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting deferred commit task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if pool.read().await.deferred_len() == 0 {
                debug!("Deferred commit: nothing to flush");
                continue;
            }

            let (flushed, committed) = {
                let mut pool_guard = pool.write().await;
                let flushed = pool_guard.deferred_len();
                (flushed, pool_guard.commit())
            };

            if committed {
                info!("Deferred commit: flushed {} items", flushed);
            } else {
                warn!("Deferred commit: {} items flushed with failures", flushed);
            }
        }
    })
}
