//! Cache key generators for consistent key naming.
//!
//! Keys follow `<entity>:<qualifier>` so each entity can be swept with a
//! single `<entity>:*` pattern.

/// Entity prefix for whole-catalog listings.
pub const PRODUCTS: &str = "products";

/// Entity prefix for single products.
pub const PRODUCT: &str = "product";

/// Namespace swept by the administrative cache flush.
pub const PRODUCTS_NAMESPACE: &str = "products";

/// Key for the full product listing.
pub fn products_all() -> String {
    format!("{}:all", PRODUCTS)
}

/// Key for one product by id.
pub fn product_by_id(id: i32) -> String {
    format!("{}:{}", PRODUCT, id)
}

/// Pattern covering every key of one entity.
pub fn entity_pattern(entity: &str) -> String {
    format!("{}:*", entity)
}
