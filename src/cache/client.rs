//! Key-Value Cache Client
//!
//! The narrow interface every cache backend implements. Payloads cross this
//! boundary as JSON strings so the trait stays object safe; [`KvStoreExt`]
//! adds typed decoding on top.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::cache::{CacheResult, ConnectionError};

/// Connection-owning client for a key-value cache store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Establishes the connection. Calling it again while connected is a no-op.
    async fn connect(&self) -> Result<(), ConnectionError>;

    /// Returns the raw payload, or `None` if the key is missing or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, expiring `ttl` from now. Overwrites.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Deletes every key matching a glob pattern and returns how many went.
    async fn delete_matching(&self, pattern: &str) -> CacheResult<u64>;

    /// Releases the connection. Safe to call more than once.
    async fn close(&self);

    fn is_connected(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Typed JSON reads for any [`KvStore`].
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Get and decode a value. A payload that fails to decode is an error.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get(key).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}
