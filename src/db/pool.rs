//! Database connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;

/// Opens the PostgreSQL pool described by `config`.
pub async fn connect(config: &Config) -> Result<PgPool> {
    info!("Connecting to PostgreSQL database...");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            e
        })?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Closes the pool, waiting for checked-out connections to return.
pub async fn close(pool: &PgPool) {
    info!("Closing database connection pool...");
    pool.close().await;
    info!("Database connection pool closed");
}
