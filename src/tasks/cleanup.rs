//! Expiry Sweep Task
//!
//! Background task that periodically drops expired entries from the
//! in-memory store. Redis expires keys on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a task that sweeps expired entries from `store` every `interval`.
///
/// Returns the JoinHandle so the task can be aborted during shutdown.
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting expiry sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KvStore;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("product:1", "{}", Duration::from_secs(1))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(Arc::clone(&store), Duration::from_millis(200));
        tokio::time::sleep(Duration::from_millis(1600)).await;

        // len() counts swept-but-unread entries, so zero means the task ran
        assert_eq!(store.len().await, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_live_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("products:all", "[]", Duration::from_secs(3600))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(Arc::clone(&store), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(
            store.get("products:all").await.unwrap().as_deref(),
            Some("[]")
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(Arc::new(MemoryStore::new()), Duration::from_secs(1));

        handle.abort();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
