//! Catalog Cache - product catalog and order API server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_cache::cache::{KvStore, MemoryStore, RedisStore};
use catalog_cache::db::{self, PgCatalogRepository};
use catalog_cache::{
    create_router, spawn_cleanup_task, spawn_reconnect_task, AppState, CacheBackend, Config,
};

/// Main entry point for the catalog API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load `.env` and configuration from environment variables
/// 3. Connect the cache backend (degraded mode when Redis is optional and down,
///    with a reconnect task bringing it back)
/// 4. Open the PostgreSQL pool
/// 5. Serve the router until SIGINT/SIGTERM
/// 6. Let pending cache writes land, then close the cache client and the pool
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using process environment");
    }

    info!("Starting Catalog Cache API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_backend={:?}, product_cache_ttl={}s",
        config.server_port, config.cache_backend, config.product_cache_ttl
    );

    let mut cleanup_handle = None;
    let mut reconnect_handle = None;
    let store: Arc<dyn KvStore> = match config.cache_backend {
        CacheBackend::Redis => {
            let redis = RedisStore::from_config(&config);
            if let Err(e) = redis.connect().await {
                if config.cache_required {
                    return Err(e).context("cache is required but could not be reached");
                }
                error!(error = %e, "Redis unavailable, serving reads from the database only");
            }
            let redis: Arc<dyn KvStore> = Arc::new(redis);
            reconnect_handle = Some(spawn_reconnect_task(
                Arc::clone(&redis),
                config.cache_reconnect_interval(),
            ));
            redis
        }
        CacheBackend::Memory => {
            let memory = Arc::new(MemoryStore::new());
            cleanup_handle = Some(spawn_cleanup_task(
                Arc::clone(&memory),
                Duration::from_secs(config.cleanup_interval),
            ));
            info!("In-memory cache initialized");
            memory
        }
    };

    let pool = db::pool::connect(&config)
        .await
        .context("failed to connect to PostgreSQL")?;
    let repo = Arc::new(PgCatalogRepository::new(pool.clone()));

    let state = AppState::new(repo, Arc::clone(&store), config.product_ttl());
    let cache = state.catalog.cache().clone();
    let cors_origin = Some(config.cors_origin.as_str()).filter(|origin| !origin.is_empty());
    let app = create_router(state, cors_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
    if let Some(handle) = reconnect_handle {
        handle.abort();
        warn!("Cache reconnect task aborted");
    }
    cache.settle().await;
    store.close().await;
    db::pool::close(&pool).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
