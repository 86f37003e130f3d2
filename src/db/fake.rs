//! In-memory repository for unit tests, counting how often each query runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::{CreateOrderRequest, Order, OrderItem, OrderWithItems, Product};

pub(crate) fn product(id: i32, name: &str) -> Product {
    Product {
        id,
        sku: format!("SKU-{:03}", id),
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        price: "10.00".to_string(),
        stock_quantity: 5,
        image_url: None,
        created_at: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeRepository {
    products: Mutex<Vec<Product>>,
    orders: Mutex<HashMap<i32, OrderWithItems>>,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Default::default()
        }
    }

    /// Makes every query fail like a lost database connection.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::SourceOfRecord(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for FakeRepository {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let needle = term.to_lowercase();
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderWithItems> {
        self.check()?;
        let mut products = self.products.lock().unwrap();
        for line in &request.items {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Product {} not found", line.product_id))
                })?;
            if product.stock_quantity < line.quantity {
                return Err(AppError::Validation(format!(
                    "Insufficient stock for product {}",
                    line.product_id
                )));
            }
        }

        let mut orders = self.orders.lock().unwrap();
        let order_id = orders.len() as i32 + 1;
        let mut items = Vec::new();
        for (n, line) in request.items.iter().enumerate() {
            if let Some(p) = products.iter_mut().find(|p| p.id == line.product_id) {
                p.stock_quantity -= line.quantity;
                items.push(OrderItem {
                    id: n as i32 + 1,
                    order_id: Some(order_id),
                    product_id: Some(p.id),
                    quantity: line.quantity,
                    price: p.price.clone(),
                    created_at: None,
                });
            }
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
        orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderWithItems>> {
        self.check()?;
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<Order>> {
        self.check()?;
        let orders = self.orders.lock().unwrap();
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| o.order.user_id == Some(user_id))
            .map(|o| o.order.clone())
            .collect();
        found.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(found)
    }
}
