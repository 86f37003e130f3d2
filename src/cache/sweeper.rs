//! Invalidation Sweeper
//!
//! Bulk deletion of cache entries by namespace. A namespace is a named set of
//! entity prefixes; sweeping it deletes `<entity>:*` for each of them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::keys::{entity_pattern, PRODUCT, PRODUCTS, PRODUCTS_NAMESPACE};
use crate::cache::pattern::escape;
use crate::cache::{CacheClientError, CacheResult, KvStore};

// == Sweep Report ==
/// Per-pattern deletion counts of one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub namespace: String,
    pub deleted: Vec<(String, u64)>,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.deleted.iter().map(|(_, count)| count).sum()
    }
}

// == Invalidation Sweeper ==
#[derive(Clone)]
pub struct InvalidationSweeper {
    store: Arc<dyn KvStore>,
    namespaces: HashMap<String, Vec<String>>,
}

impl InvalidationSweeper {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            namespaces: HashMap::new(),
        }
    }

    /// Sweeper with the catalog's `products` namespace registered.
    pub fn for_catalog(store: Arc<dyn KvStore>) -> Self {
        let patterns = vec![entity_pattern(PRODUCTS), entity_pattern(PRODUCT)];
        Self {
            store,
            namespaces: HashMap::from([(PRODUCTS_NAMESPACE.to_string(), patterns)]),
        }
    }

    /// Adds `entity` to `namespace`; sweeping the namespace will delete
    /// every `<entity>:*` key.
    ///
    /// The entity must be a plain name: glob metacharacters or a `:` would let
    /// the pattern reach into other entities.
    pub fn register(&mut self, namespace: &str, entity: &str) -> CacheResult<()> {
        let invalid = entity.is_empty()
            || entity
                .chars()
                .any(|c| matches!(c, '*' | '?' | '[' | ']' | '\\' | ':'));
        if invalid {
            return Err(CacheClientError::Rejected(format!(
                "invalid entity name '{}'",
                entity
            )));
        }

        let pattern = entity_pattern(entity);
        let patterns = self.namespaces.entry(namespace.to_string()).or_default();
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
        Ok(())
    }

    /// Patterns registered for `namespace`.
    pub fn patterns(&self, namespace: &str) -> &[String] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // == Invalidate ==
    /// Deletes every entry of `namespace`. Sweeping an empty or unknown
    /// namespace reports zero deletions.
    pub async fn invalidate(&self, namespace: &str) -> CacheResult<SweepReport> {
        let patterns = self.patterns(namespace);
        if patterns.is_empty() {
            warn!(namespace = %namespace, "no patterns registered for namespace");
        }

        let mut report = SweepReport {
            namespace: namespace.to_string(),
            deleted: Vec::with_capacity(patterns.len()),
        };

        for pattern in patterns {
            let count = self.store.delete_matching(pattern).await?;
            report.deleted.push((pattern.clone(), count));
        }

        info!(
            namespace = %namespace,
            deleted = report.total(),
            "cache namespace invalidated"
        );
        Ok(report)
    }

    /// Deletes one exact key. Returns 1 if it existed, else 0.
    pub async fn invalidate_key(&self, key: &str) -> CacheResult<u64> {
        self.store.delete_matching(&escape(key)).await
    }
}
