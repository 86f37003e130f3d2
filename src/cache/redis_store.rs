//! Redis Store Module
//!
//! Remote key-value backend over a deadpool connection pool. Every command is
//! bounded by a timeout; pattern deletion walks the key space with `SCAN` so
//! large namespaces are never loaded at once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{cmd, AsyncCommands};
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::retry::RetryPolicy;
use crate::cache::{CacheClientError, CacheResult, ConnectionError, KvStore};
use crate::config::Config;

// == Redis Store ==
/// Pooled Redis client. Starts disconnected; see [`KvStore::connect`].
pub struct RedisStore {
    url: String,
    pool: RwLock<Option<Pool>>,
    connected: AtomicBool,
    retry: RetryPolicy,
    connect_timeout: Duration,
    op_timeout: Duration,
    scan_count: usize,
}

impl RedisStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: RwLock::new(None),
            connected: AtomicBool::new(false),
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(2),
            op_timeout: Duration::from_millis(500),
            scan_count: 100,
        }
    }

    /// Builds a store from the cache settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.redis_url.clone())
            .with_retry(RetryPolicy::with_max_attempts(config.cache_connect_attempts))
            .with_timeouts(config.cache_connect_timeout(), config.cache_op_timeout())
            .with_scan_count(config.cache_scan_count)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, op_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.op_timeout = op_timeout;
        self
    }

    /// Page size hint passed to `SCAN ... COUNT`.
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }

    async fn conn(&self) -> CacheResult<Connection> {
        let pool = self
            .pool
            .read()
            .await
            .clone()
            .ok_or(CacheClientError::NotConnected)?;
        Ok(pool.get().await?)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheClientError::Timeout {
                op,
                after: self.op_timeout,
            })?
    }

    /// Keeps the connected flag in step with what commands observe.
    fn observe<T>(&self, result: CacheResult<T>) -> CacheResult<T> {
        match &result {
            Ok(_) => {
                if !self.connected.swap(true, Ordering::SeqCst) {
                    info!("Redis reachable again");
                }
            }
            Err(e) if is_connection_fault(e) => {
                if self.connected.swap(false, Ordering::SeqCst) {
                    warn!(error = %e, "Redis unreachable, cache degraded");
                }
            }
            Err(_) => {}
        }
        result
    }

    /// `SCAN MATCH` page by page, deleting each page before fetching the next.
    async fn scan_delete(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.bounded("CONNECT", self.conn()).await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded("SCAN", async {
                    let page: (u64, Vec<String>) = cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(self.scan_count)
                        .query_async(&mut conn)
                        .await?;
                    Ok::<_, CacheClientError>(page)
                })
                .await?;

            if !keys.is_empty() {
                let removed: u64 = self
                    .bounded("DEL", async {
                        let removed: u64 = conn.del(&keys).await?;
                        Ok::<_, CacheClientError>(removed)
                    })
                    .await?;
                deleted += removed;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }
}

/// Errors that mean the server itself is gone, as opposed to a bad command.
fn is_connection_fault(error: &CacheClientError) -> bool {
    match error {
        CacheClientError::Pool(_) => true,
        CacheClientError::Transport(e) => {
            e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
        }
        _ => false,
    }
}

async fn ping(pool: &Pool, timeout: Duration) -> CacheResult<()> {
    let attempt = async {
        let mut conn = pool.get().await?;
        let _: String = cmd("PING").query_async(&mut conn).await?;
        Ok::<_, CacheClientError>(())
    };

    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| CacheClientError::Timeout {
            op: "PING",
            after: timeout,
        })?
}

#[async_trait]
impl KvStore for RedisStore {
    async fn connect(&self) -> Result<(), ConnectionError> {
        // Held across the attempts so concurrent callers connect only once
        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            if self.is_connected() {
                debug!("Redis already connected, skipping connect");
                return Ok(());
            }

            // Pool survived an outage; only the server needs to answer again
            self.retry
                .execute(|| ping(pool, self.connect_timeout))
                .await
                .map_err(|(e, attempts)| ConnectionError::new(self.url.as_str(), attempts, e))?;
            self.connected.store(true, Ordering::SeqCst);
            info!("Redis connection restored");
            return Ok(());
        }

        info!("Connecting to Redis at {}", self.url);

        let pool = PoolConfig::from_url(self.url.as_str())
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ConnectionError::new(self.url.as_str(), 0, e))?;

        self.retry
            .execute(|| ping(&pool, self.connect_timeout))
            .await
            .map_err(|(e, attempts)| {
                warn!("Failed to connect to Redis: {}", e);
                pool.close();
                ConnectionError::new(self.url.as_str(), attempts, e)
            })?;

        *slot = Some(pool);
        self.connected.store(true, Ordering::SeqCst);
        info!("Redis connection pool established");
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.observe(
            self.bounded("GET", async {
                let mut conn = self.conn().await?;
                let value: Option<String> = conn.get(key).await?;
                Ok::<_, CacheClientError>(value)
            })
            .await,
        )?;

        match &value {
            Some(_) => debug!(key = %key, "redis hit"),
            None => debug!(key = %key, "redis miss"),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl_secs = ttl.as_secs();
        if ttl_secs == 0 {
            return Err(CacheClientError::InvalidTtl(ttl));
        }

        self.observe(
            self.bounded("SET", async {
                let mut conn = self.conn().await?;
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
                Ok::<_, CacheClientError>(())
            })
            .await,
        )?;

        debug!(key = %key, ttl_secs, "redis set");
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<u64> {
        let deleted = self.observe(self.scan_delete(pattern).await)?;
        debug!(pattern = %pattern, deleted, "redis pattern delete");
        Ok(deleted)
    }

    async fn close(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close();
            info!("Redis connection pool closed");
        }
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
