//! Order records. Orders are read straight from the source of record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub user_id: Option<i32>,
    pub status: String,
    pub total_amount: String,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Option<i32>,
    pub product_id: Option<i32>,
    pub quantity: i32,
    /// Unit price at the time of purchase
    pub price: String,
    pub created_at: Option<NaiveDateTime>,
}

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
