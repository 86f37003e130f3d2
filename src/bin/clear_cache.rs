//! Flushes every cached product entry from Redis.
//!
//! Exits non-zero when Redis cannot be reached or a sweep fails.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_cache::cache::{keys, InvalidationSweeper, KvStore, RedisStore};
use catalog_cache::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!(url = %config.redis_url, "Clearing product cache");
    let store = Arc::new(RedisStore::from_config(&config));
    store
        .connect()
        .await
        .context("could not connect to Redis")?;

    let sweeper = InvalidationSweeper::for_catalog(store.clone());
    let result = sweeper.invalidate(keys::PRODUCTS_NAMESPACE).await;
    store.close().await;

    let report = result.context("cache sweep failed")?;
    for (pattern, deleted) in &report.deleted {
        println!("Cleared {} entries matching {}", deleted, pattern);
    }
    println!("Cache cleared: {} entries removed", report.total());

    Ok(())
}
