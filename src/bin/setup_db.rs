//! Creates the catalog schema and seeds sample users and products.
//!
//! Safe to run repeatedly.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_cache::db::{pool, schema};
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

    let pool = pool::connect(&config)
        .await
        .context("failed to connect to PostgreSQL")?;

    let result = async {
        schema::apply_schema(&pool).await?;
        schema::seed(&pool).await
    }
    .await;
    pool::close(&pool).await;

    result.context("database setup failed")?;
    info!("Database setup complete");
    Ok(())
}
