//! Cache Reconnect Task
//!
//! Background task that brings a disconnected cache store back. Reads keep
//! going to the database while it is down; once `connect` succeeds the
//! accessor starts hitting the cache again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::KvStore;

/// Spawns a task that retries `store.connect()` every `interval` while the
/// store reports itself disconnected.
///
/// Returns the JoinHandle so the task can be aborted during shutdown.
pub fn spawn_reconnect_task(store: Arc<dyn KvStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            backend = store.backend(),
            "Starting cache reconnect task"
        );

        loop {
            tokio::time::sleep(interval).await;

            if store.is_connected() {
                continue;
            }

            match store.connect().await {
                Ok(()) => info!(backend = store.backend(), "Cache store reconnected"),
                Err(e) => debug!(error = %e, "Cache store still unreachable"),
            }
        }
    })
}
