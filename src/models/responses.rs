//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{Cached, StatsSnapshot};

/// Listing read through the cache: `{ items, cached }`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// True when served from the cache
    pub cached: bool,
}

impl<T> From<Cached<Vec<T>>> for ListResponse<T> {
    fn from(cached: Cached<Vec<T>>) -> Self {
        Self {
            cached: cached.is_cached(),
            items: cached.into_inner(),
        }
    }
}

/// Single record read through the cache: `{ item, cached }`
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse<T> {
    pub item: T,
    pub cached: bool,
}

impl<T> From<Cached<T>> for ItemResponse<T> {
    fn from(cached: Cached<T>) -> Self {
        Self {
            cached: cached.is_cached(),
            item: cached.into_inner(),
        }
    }
}

/// Uncached search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub query: String,
}

impl<T> SearchResponse<T> {
    pub fn new(items: Vec<T>, query: impl Into<String>) -> Self {
        Self {
            count: items.len(),
            items,
            query: query.into(),
        }
    }
}

/// Uncached record: `{ item }`
#[derive(Debug, Clone, Serialize)]
pub struct RecordResponse<T> {
    pub item: T,
}

/// Uncached collection: `{ items, count }`
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> CollectionResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub cache_errors: u64,
    pub write_failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            cache_errors: snapshot.cache_errors,
            write_failures: snapshot.write_failures,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Cache section of the health report
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub connected: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" while the cache is unreachable
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheHealth,
}

impl HealthResponse {
    pub fn new(cache: CacheHealth) -> Self {
        let status = if cache.connected { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}
