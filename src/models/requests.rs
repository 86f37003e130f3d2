//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

/// Query string of `GET /api/products/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Text matched against product name and description
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    /// The trimmed search term, if one was given.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Largest quantity a single order line may ask for.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// One line of an order being placed.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// Request body of `POST /api/orders`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i32,
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl CreateOrderRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.user_id <= 0 {
            return Some("Invalid user ID".to_string());
        }
        if self.items.is_empty() {
            return Some("Order must contain at least one item".to_string());
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity <= 0) {
            return Some(format!(
                "Quantity for product {} must be positive",
                line.product_id
            ));
        }
        if let Some(line) = self
            .items
            .iter()
            .find(|line| line.quantity > MAX_LINE_QUANTITY)
        {
            return Some(format!(
                "Quantity for product {} exceeds {}",
                line.product_id, MAX_LINE_QUANTITY
            ));
        }
        if let Some(line) = self.items.iter().find(|line| line.product_id <= 0) {
            return Some(format!("Invalid product ID {}", line.product_id));
        }
        None
    }
}
