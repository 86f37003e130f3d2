//! Records and request/response models for the catalog API
//!
//! Product and order records double as source-of-record rows and cache
//! payloads; the request/response DTOs shape HTTP bodies.

pub mod order;
pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::Product;
pub use requests::{CreateOrderRequest, OrderLine, SearchQuery};
pub use responses::{
    CacheHealth, CollectionResponse, ErrorResponse, HealthResponse, ItemResponse, ListResponse,
    RecordResponse, SearchResponse, StatsResponse,
};
