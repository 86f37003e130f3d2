//! Cache Module
//!
//! Cache-aside access layer: key-value store clients (Redis and in-memory),
//! the read-through accessor and the namespace invalidation sweeper.

mod aside;
mod client;
mod entry;
mod error;
pub mod keys;
mod memory;
pub mod pattern;
mod redis_store;
pub mod retry;
mod stats;
mod sweeper;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use aside::{CacheAside, Cached, Source};
pub use client::{KvStore, KvStoreExt};
pub use entry::CacheEntry;
pub use error::{CacheClientError, CacheResult, ConnectionError};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use stats::{CacheStats, StatsSnapshot};
pub use sweeper::{InvalidationSweeper, SweepReport};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
