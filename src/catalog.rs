//! Product Catalog
//!
//! Product reads for the HTTP layer. Listings and single products go through
//! the cache-aside accessor; searches always hit the source of record.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, Span};

use crate::cache::{keys, CacheAside, Cached};
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::Product;

#[derive(Clone)]
pub struct ProductCatalog {
    repo: Arc<dyn CatalogRepository>,
    cache: CacheAside,
    ttl: Duration,
}

impl ProductCatalog {
    pub fn new(repo: Arc<dyn CatalogRepository>, cache: CacheAside, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    /// Every product, ordered by name, cached under `products:all`.
    pub async fn list_products(&self) -> Result<Cached<Vec<Product>>> {
        let repo = Arc::clone(&self.repo);
        let products = self
            .cache
            .read_through(&keys::products_all(), self.ttl, || async move {
                repo.list_products().await
            })
            .await?;

        let count = products.value.len();
        if products.is_cached() {
            info!(count, "products.served_from_cache");
        } else {
            info!(count, "products.served_from_database");
        }
        Ok(products)
    }

    /// One product, cached under `product:<id>`. Absent products are not cached.
    pub async fn get_product(&self, id: i32) -> Result<Cached<Product>> {
        let repo = Arc::clone(&self.repo);
        let product = self
            .cache
            .read_through(&keys::product_by_id(id), self.ttl, || async move {
                repo.find_product(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
            })
            .await?;

        if product.is_cached() {
            info!(product_id = id, "product.served_from_cache");
        } else {
            info!(product_id = id, "product.served_from_database");
        }
        Ok(product)
    }

    /// Case-insensitive match on name or description. Never cached.
    #[instrument(
        name = "products.search",
        skip(self),
        fields(search.query = %term, search.results_count = tracing::field::Empty)
    )]
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let products = self.repo.search_products(term).await?;

        Span::current().record("search.results_count", products.len());
        info!(query = %term, count = products.len(), "products.searched");
        Ok(products)
    }
}
