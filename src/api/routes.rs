//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use super::handlers::{
    create_order_handler, get_order_handler, get_product_handler, health_handler,
    list_products_handler, not_found_handler, root_handler, search_products_handler,
    stats_handler, user_orders_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// `/api/products/search` is registered ahead of `/api/products/:id`. When
/// `cors_origin` is set, only that origin may call the API, with credentials.
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/api/products", get(list_products_handler))
        .route("/api/products/search", get(search_products_handler))
        .route("/api/products/:id", get(get_product_handler))
        .route("/api/orders", post(create_order_handler))
        .route("/api/orders/user/:user_id", get(user_orders_handler))
        .route("/api/orders/:id", get(get_order_handler))
        .fallback(not_found_handler);

    let router = match cors_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => router.layer(cors(origin)),
        Some(Err(e)) => {
            warn!(error = %e, "invalid CORS origin, cross-origin requests disabled");
            router
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
