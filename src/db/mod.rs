//! Source of record: PostgreSQL pool, queries and schema.

pub mod pool;
pub mod repository;
pub mod schema;

#[cfg(test)]
pub(crate) mod fake;

pub use repository::{CatalogRepository, PgCatalogRepository};
