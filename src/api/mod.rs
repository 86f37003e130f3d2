//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /api/products` - All products, read through the cache
//! - `GET /api/products/:id` - One product, read through the cache
//! - `GET /api/products/search?q=` - Uncached search
//! - `POST /api/orders` - Place an order
//! - `GET /api/orders/:id` - One order with its items
//! - `GET /api/orders/user/:user_id` - A user's orders
//! - `GET /stats` - Cache-aside counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
