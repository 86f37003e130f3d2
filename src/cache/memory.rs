//! In-Memory Store Module
//!
//! Process-local key-value backend with TTL expiration. Used for single
//! instance runs and as the store behind tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::pattern::glob_match;
use crate::cache::{
    CacheClientError, CacheEntry, CacheResult, ConnectionError, KvStore, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};

// == Memory Store ==
/// HashMap-backed store; expired entries are dropped lazily on read and by
/// [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remaining lifetime of a live entry.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    fn validate(key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheClientError::Rejected(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheClientError::Rejected(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if ttl.as_secs() == 0 {
            return Err(CacheClientError::InvalidTtl(ttl));
        }

        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn connect(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // A writer may have replaced the entry between the two locks
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
            debug!(key = %key, "expired entry dropped on read");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        Self::validate(key, value, ttl)?;

        let entry = CacheEntry::new(value.to_string(), ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        let deleted = (before - entries.len()) as u64;

        debug!(pattern = %pattern, deleted, "deleted matching keys");
        Ok(deleted)
    }

    async fn close(&self) {}

    fn is_connected(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
