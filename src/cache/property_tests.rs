//! Property-Based Tests for Cache Module
//!
//! Store and accessor properties checked with proptest against the in-memory
//! backend. Async calls run under `tokio_test::block_on`.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_test::block_on;

use crate::cache::pattern::{escape, glob_match};
use crate::cache::{keys, CacheAside, KvStore, MemoryStore, MAX_KEY_LENGTH};

const TTL: Duration = Duration::from_secs(300);

// == Strategies ==
fn entity_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

/// `<entity>:<qualifier>` keys
fn key_strategy() -> impl Strategy<Value = String> {
    (entity_strategy(), "[a-zA-Z0-9_]{1,32}").prop_map(|(entity, q)| format!("{}:{}", entity, q))
}

fn value_strategy() -> impl Strategy<Value = String> {
    ".{0,256}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A value written with a positive TTL reads back unchanged.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in value_strategy()) {
        let store = MemoryStore::new();
        let got = block_on(async {
            store.set(&key, &value, TTL).await.unwrap();
            store.get(&key).await.unwrap()
        });
        prop_assert_eq!(got, Some(value));
    }

    // Reading a key that was never written finds nothing.
    #[test]
    fn prop_unwritten_key_absent(
        written in prop::collection::hash_set(key_strategy(), 0..20),
        absent in key_strategy(),
    ) {
        prop_assume!(!written.contains(&absent));
        let store = MemoryStore::new();
        let got = block_on(async {
            for key in &written {
                store.set(key, "v", TTL).await.unwrap();
            }
            store.get(&absent).await.unwrap()
        });
        prop_assert_eq!(got, None);
    }

    // Sweeping `<entity>:*` removes exactly that entity's keys.
    #[test]
    fn prop_entity_sweep_isolated(
        written in prop::collection::hash_set(key_strategy(), 1..30),
        entity in entity_strategy(),
    ) {
        let store = MemoryStore::new();
        let prefix = format!("{}:", entity);
        let expected = written.iter().filter(|k| k.starts_with(&prefix)).count() as u64;

        let (deleted, survivors) = block_on(async {
            for key in &written {
                store.set(key, "v", TTL).await.unwrap();
            }
            let deleted = store.delete_matching(&keys::entity_pattern(&entity)).await.unwrap();

            let mut survivors = HashMap::new();
            for key in &written {
                survivors.insert(key.clone(), store.get(key).await.unwrap().is_some());
            }
            (deleted, survivors)
        });

        prop_assert_eq!(deleted, expected);
        for (key, present) in survivors {
            prop_assert_eq!(present, !key.starts_with(&prefix), "key {}", key);
        }
    }

    // Two reads through the accessor run the loader once.
    #[test]
    fn prop_read_through_loads_once(key in key_strategy(), value in prop::collection::vec(any::<i64>(), 0..10)) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let cache = CacheAside::new(store);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let (first, second) = block_on(async {
            let load = || {
                let value = value.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>(value)
                }
            };
            let first = cache.read_through(&key, TTL, load).await.unwrap();
            cache.settle().await;
            let second = cache.read_through(&key, TTL, load).await.unwrap();
            (first, second)
        });

        prop_assert!(!first.is_cached());
        prop_assert!(second.is_cached());
        prop_assert_eq!(first.value, second.value);
        prop_assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    // An escaped key, used as a pattern, matches only itself.
    #[test]
    fn prop_escaped_key_matches_only_itself(key in "[ -~]{1,40}", other in "[ -~]{1,40}") {
        let pattern = escape(&key);
        prop_assert!(glob_match(&pattern, &key));
        prop_assert_eq!(glob_match(&pattern, &other), key == other);
    }

    // Over-long keys are refused rather than truncated.
    #[test]
    fn prop_oversized_key_rejected(extra in 1usize..64) {
        let store = MemoryStore::new();
        let key = "k".repeat(MAX_KEY_LENGTH + extra);
        let result = block_on(store.set(&key, "v", TTL));
        prop_assert!(result.is_err());
    }
}
