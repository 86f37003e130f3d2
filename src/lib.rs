//! Catalog Cache - product catalog and order API with a cache-aside layer
//!
//! Product reads go through a key-value cache (Redis or in-memory) in front of
//! PostgreSQL; writes that change products flush the product namespace.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use catalog::ProductCatalog;
pub use config::{CacheBackend, Config};
pub use error::{AppError, Result};
pub use tasks::{spawn_cleanup_task, spawn_reconnect_task};
