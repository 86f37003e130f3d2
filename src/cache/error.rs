//! Cache Error Module
//!
//! Errors raised by key-value cache clients. None of these reach HTTP callers:
//! the accessor logs them and falls back to the source of record.

use std::time::Duration;

use deadpool_redis::redis::RedisError;
use thiserror::Error;

// == Cache Client Error ==
/// Transport or protocol fault while talking to the cache store.
#[derive(Error, Debug)]
pub enum CacheClientError {
    /// The store was never connected, or has been closed
    #[error("cache store is not connected")]
    NotConnected,

    /// An operation exceeded its time budget
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// Error reported by the Redis server or connection
    #[error("redis transport error: {0}")]
    Transport(#[from] RedisError),

    /// Could not check a connection out of the pool
    #[error("redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Payload could not be encoded or decoded
    #[error("cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entries must expire
    #[error("ttl must be at least one second, got {0:?}")]
    InvalidTtl(Duration),

    /// The store refused the entry (key or value limits)
    #[error("entry rejected: {0}")]
    Rejected(String),
}

// == Connection Error ==
/// The cache store stayed unreachable after the whole retry budget.
#[derive(Error, Debug)]
#[error("could not connect to cache store at {url} after {attempts} attempt(s): {reason}")]
pub struct ConnectionError {
    pub url: String,
    pub attempts: u32,
    pub reason: String,
}

impl ConnectionError {
    pub fn new(url: impl Into<String>, attempts: u32, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            attempts,
            reason: reason.to_string(),
        }
    }
}

/// Result type for cache client operations.
pub type CacheResult<T> = std::result::Result<T, CacheClientError>;
