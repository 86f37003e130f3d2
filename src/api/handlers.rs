//! API Handlers
//!
//! HTTP request handlers for the catalog and order endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::cache::{keys, CacheAside, InvalidationSweeper, KvStore};
use crate::catalog::ProductCatalog;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::{
    CacheHealth, CollectionResponse, CreateOrderRequest, HealthResponse, ItemResponse,
    ListResponse, Order, OrderWithItems, Product, RecordResponse, SearchQuery, SearchResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ProductCatalog,
    /// Uncached access for orders
    pub repo: Arc<dyn CatalogRepository>,
    pub sweeper: InvalidationSweeper,
}

impl AppState {
    /// Wires the catalog, sweeper and repository around one shared store.
    pub fn new(
        repo: Arc<dyn CatalogRepository>,
        store: Arc<dyn KvStore>,
        product_ttl: Duration,
    ) -> Self {
        let cache = CacheAside::new(Arc::clone(&store));
        Self {
            catalog: ProductCatalog::new(Arc::clone(&repo), cache, product_ttl),
            repo,
            sweeper: InvalidationSweeper::for_catalog(store),
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Invalid {} ID", what)))
}

/// Handler for GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "catalog_cache",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Product catalog and order API with a cache-aside layer",
        "endpoints": {
            "health": "GET /health",
            "stats": "GET /stats",
            "products": {
                "list": "GET /api/products",
                "getById": "GET /api/products/:id",
                "search": "GET /api/products/search?q=query",
            },
            "orders": {
                "create": "POST /api/orders",
                "getById": "GET /api/orders/:id",
                "getByUser": "GET /api/orders/user/:userId",
            },
        },
    }))
}

/// Handler for GET /health
///
/// Reports "degraded" while the cache is unreachable; the API keeps serving
/// from the database in that state.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.catalog.cache().store();
    Json(HealthResponse::new(CacheHealth {
        backend: store.backend(),
        connected: store.is_connected(),
    }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.catalog.cache().stats().into())
}

// == Products ==

/// Handler for GET /api/products
pub async fn list_products_handler(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Product>>> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products.into()))
}

/// Handler for GET /api/products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse<Product>>> {
    let id = parse_id(&id, "product")?;
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product.into()))
}

/// Handler for GET /api/products/search?q=
pub async fn search_products_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse<Product>>> {
    let term = query
        .term()
        .ok_or_else(|| AppError::Validation("Search query is required".to_string()))?;

    let products = state.catalog.search_products(term).await?;
    Ok(Json(SearchResponse::new(products, term)))
}

// == Orders ==

/// Handler for POST /api/orders
///
/// Placing an order changes stock, so the product namespace is flushed once
/// the transaction has committed. A failed flush is logged and the cached
/// entries age out with their TTL.
pub async fn create_order_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<RecordResponse<OrderWithItems>>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::Validation(error_msg));
    }

    let order = state.repo.create_order(&req).await?;
    info!(order_id = order.order.id, user_id = req.user_id, "order.created");

    match state.sweeper.invalidate(keys::PRODUCTS_NAMESPACE).await {
        Ok(report) => info!(deleted = report.total(), "product cache invalidated"),
        Err(e) => warn!(error = %e, "product cache invalidation failed"),
    }

    Ok((StatusCode::CREATED, Json(RecordResponse { item: order })))
}

/// Handler for GET /api/orders/:id
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse<OrderWithItems>>> {
    let id = parse_id(&id, "order")?;
    let order = state
        .repo
        .find_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(RecordResponse { item: order }))
}

/// Handler for GET /api/orders/user/:user_id
pub async fn user_orders_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CollectionResponse<Order>>> {
    let user_id = parse_id(&user_id, "user")?;
    let orders = state.repo.orders_for_user(user_id).await?;
    Ok(Json(CollectionResponse::new(orders)))
}

/// Fallback for unknown routes
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::db::fake::{product, FakeRepository};
    use crate::models::OrderLine;

    fn state_with(repo: Arc<FakeRepository>) -> (AppState, Arc<dyn KvStore>) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(repo, Arc::clone(&store), Duration::from_secs(300));
        (state, store)
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "product").unwrap(), 42);
        let err = parse_id("abc", "product").unwrap_err();
        assert_eq!(err.to_string(), "Invalid product ID");
    }

    #[tokio::test]
    async fn test_get_product_handler_reports_source() {
        let repo = Arc::new(FakeRepository::with_products(vec![product(1, "Laptop")]));
        let (state, _) = state_with(repo);

        let first = get_product_handler(State(state.clone()), Path("1".to_string()))
            .await
            .unwrap();
        assert!(!first.cached);
        assert_eq!(first.item.name, "Laptop");
        state.catalog.cache().settle().await;

        let second = get_product_handler(State(state), Path("1".to_string()))
            .await
            .unwrap();
        assert!(second.cached);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (state, _) = state_with(Arc::new(FakeRepository::default()));

        let result = search_products_handler(State(state), Query(SearchQuery::default())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_order_flushes_product_cache() {
        let repo = Arc::new(FakeRepository::with_products(vec![product(1, "Laptop")]));
        let (state, store) = state_with(repo);

        list_products_handler(State(state.clone())).await.unwrap();
        get_product_handler(State(state.clone()), Path("1".to_string()))
            .await
            .unwrap();
        state.catalog.cache().settle().await;
        assert!(store.get("products:all").await.unwrap().is_some());

        let req = CreateOrderRequest {
            user_id: 1,
            items: vec![OrderLine {
                product_id: 1,
                quantity: 2,
            }],
            payment_method: Some("card".to_string()),
        };
        let (status, order) = create_order_handler(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order.item.items.len(), 1);

        assert!(store.get("products:all").await.unwrap().is_none());
        assert!(store.get("product:1").await.unwrap().is_none());

        let product = get_product_handler(State(state), Path("1".to_string()))
            .await
            .unwrap();
        assert!(!product.cached);
        assert_eq!(product.item.stock_quantity, 3);
    }

    #[tokio::test]
    async fn test_create_order_rejects_invalid_request() {
        let (state, _) = state_with(Arc::new(FakeRepository::default()));
        let req = CreateOrderRequest {
            user_id: 1,
            items: vec![],
            payment_method: None,
        };

        let result = create_order_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let (state, _) = state_with(Arc::new(FakeRepository::default()));

        let result = get_order_handler(State(state), Path("9".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let (state, _) = state_with(Arc::new(FakeRepository::default()));

        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cache.backend, "memory");
    }
}
