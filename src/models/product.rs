//! Product record as stored in the source of record and in the cache.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product.
///
/// `price` is carried as the decimal text the database produces, so no
/// precision is lost on the way to the client or through the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
