//! Shared fixtures for the API integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use catalog_cache::db::CatalogRepository;
use catalog_cache::models::{CreateOrderRequest, Order, OrderItem, OrderWithItems, Product};
use catalog_cache::{AppError, Result};

pub fn product(id: i32, name: &str, description: &str) -> Product {
    Product {
        id,
        sku: format!("SKU-{:03}", id),
        name: name.to_string(),
        description: Some(description.to_string()),
        price: "19.99".to_string(),
        stock_quantity: 10,
        image_url: None,
        created_at: None,
    }
}

/// Catalog held in memory, counting source-of-record round trips.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<Vec<Product>>,
    orders: Mutex<Vec<OrderWithItems>>,
    queries: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Default::default()
        }
    }

    /// Number of queries that reached this repository.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.hit();
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>> {
        self.hit();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        self.hit();
        let term = term.to_lowercase();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .cloned()
            .collect())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderWithItems> {
        self.hit();
        if request.user_id != 1 {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                request.user_id
            )));
        }

        let mut products = self.products.lock().unwrap();
        let mut orders = self.orders.lock().unwrap();
        let order_id = orders.len() as i32 + 1;

        let mut items = Vec::new();
        for line in &request.items {
            let product = products
                .iter_mut()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Product {} not found", line.product_id))
                })?;
            if product.stock_quantity < line.quantity {
                return Err(AppError::Validation(format!(
                    "Insufficient stock for product {}",
                    product.id
                )));
            }
            product.stock_quantity -= line.quantity;
            items.push(OrderItem {
                id: items.len() as i32 + 1,
                order_id: Some(order_id),
                product_id: Some(product.id),
                quantity: line.quantity,
                price: product.price.clone(),
                created_at: None,
            });
        }

        let order = OrderWithItems {
            order: Order {
                id: order_id,
                user_id: Some(request.user_id),
                status: "pending".to_string(),
                total_amount: "0.00".to_string(),
                payment_method: request.payment_method.clone(),
                payment_status: Some("pending".to_string()),
                created_at: None,
                updated_at: None,
            },
            items,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderWithItems>> {
        self.hit();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order.id == id)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<Order>> {
        self.hit();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| o.order.user_id == Some(user_id))
            .map(|o| o.order.clone())
            .collect())
    }
}
