//! Cache-Aside Accessor
//!
//! Read path policy: serve from cache when an entry is present, otherwise run
//! the loader against the source of record and repopulate with a fixed TTL.
//!
//! Reads are only as fresh as the TTL allows. There is no per-key
//! serialization: concurrent misses for one key each run the loader and the
//! last write wins.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::cache::{CacheStats, KvStore, KvStoreExt, StatsSnapshot};

// == Source ==
/// Where a value handed back by [`CacheAside::read_through`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    SourceOfRecord,
}

// == Cached ==
/// A value annotated with its [`Source`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Cached<T> {
    pub fn from_cache(value: T) -> Self {
        Self {
            value,
            source: Source::Cache,
        }
    }

    pub fn from_source(value: T) -> Self {
        Self {
            value,
            source: Source::SourceOfRecord,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

// == Pending Writes ==
/// Count of populate writes still running, with a wakeup when it drops to zero.
#[derive(Default)]
struct PendingWrites {
    count: AtomicUsize,
    idle: Notify,
}

impl PendingWrites {
    fn begin(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

// == Cache Aside ==
/// Cache-aside accessor; the only component that writes cache entries.
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn KvStore>,
    stats: Arc<CacheStats>,
    pending: Arc<PendingWrites>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            stats: Arc::new(CacheStats::new()),
            pending: Arc::new(PendingWrites::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of cache writes started by [`read_through`](Self::read_through)
    /// that have not finished yet.
    pub fn pending_writes(&self) -> usize {
        self.pending.count.load(Ordering::SeqCst)
    }

    /// Waits until every in-flight cache write has finished.
    pub async fn settle(&self) {
        loop {
            // Registered before the check so a wakeup in between is not lost
            let idle = self.pending.idle.notified();
            if self.pending_writes() == 0 {
                return;
            }
            idle.await;
        }
    }

    // == Read Through ==
    /// Returns the cached value for `key`, or loads, caches and returns it.
    ///
    /// Loader errors propagate untouched and leave the cache as it was. Cache
    /// faults on either side are logged and never reach the caller: a failed
    /// read counts as a miss, a failed write is dropped. The write itself runs
    /// in the background; the loaded value is returned without waiting for it.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.store.get_json::<T>(key).await {
            Ok(Some(value)) => {
                self.stats.record_hit();
                debug!(key = %key, "cache hit");
                return Ok(Cached::from_cache(value));
            }
            Ok(None) => debug!(key = %key, "cache miss"),
            Err(e) => {
                self.stats.record_cache_error();
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
            }
        }
        self.stats.record_miss();

        let value = loader().await?;

        match serde_json::to_string(&value) {
            // A null payload would read back as a cached "nothing here"
            Ok(payload) if payload == "null" => {
                debug!(key = %key, "loader returned null, not caching");
            }
            Ok(payload) => self.populate(key, payload, ttl),
            Err(e) => {
                self.stats.record_write_failure();
                warn!(key = %key, error = %e, "could not encode value for cache");
            }
        }

        Ok(Cached::from_source(value))
    }

    /// Writes `payload` on a detached task. The write outlives the request
    /// that triggered it and is never aborted halfway.
    fn populate(&self, key: &str, payload: String, ttl: Duration) {
        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        let pending = Arc::clone(&self.pending);
        let key = key.to_string();

        pending.begin();
        tokio::spawn(async move {
            match store.set(&key, &payload, ttl).await {
                Ok(()) => debug!(key = %key, ttl_secs = ttl.as_secs(), "cache populated"),
                Err(e) => {
                    stats.record_write_failure();
                    warn!(key = %key, error = %e, "cache write failed");
                }
            }
            pending.finish();
        });
    }
}
