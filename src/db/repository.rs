//! Source-of-record queries.
//!
//! [`CatalogRepository`] is everything the API asks of the relational store.
//! The cache-aside layer only reaches it on a miss.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{CreateOrderRequest, Order, OrderItem, OrderLine, OrderWithItems, Product};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, price::text AS price, stock_quantity, image_url, created_at";

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount::text AS total_amount, \
     payment_method, payment_status, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price::text AS price, created_at";

/// Sums order lines per product, so repeated lines are checked against stock
/// together. Keys iterate in id order, which is also the row lock order.
pub(crate) fn quantities_by_product(items: &[OrderLine]) -> Result<BTreeMap<i32, i32>> {
    let mut wanted: BTreeMap<i32, i32> = BTreeMap::new();
    for line in items {
        let total = wanted.entry(line.product_id).or_default();
        *total = total.checked_add(line.quantity).ok_or_else(|| {
            AppError::Validation(format!("Quantity for product {} is too large", line.product_id))
        })?;
    }
    Ok(wanted)
}

/// Queries against the source of record.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn find_product(&self, id: i32) -> Result<Option<Product>>;

    /// Products whose name or description contains `term`, case-insensitively.
    async fn search_products(&self, term: &str) -> Result<Vec<Product>>;

    /// Places an order, pricing lines from the catalog and taking stock.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderWithItems>;

    async fn find_order(&self, id: i32) -> Result<Option<OrderWithItems>>;

    /// A user's orders, newest first.
    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<Order>>;
}

// == PostgreSQL Repository ==
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLUMNS);
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY name",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(format!("%{}%", term))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderWithItems> {
        let wanted = quantities_by_product(&request.items)?;

        let mut tx = self.pool.begin().await?;

        let user: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(request.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if user.is_none() {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                request.user_id
            )));
        }

        // Row locks in id order
        for (&product_id, &quantity) in &wanted {
            let stock: Option<i32> =
                sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1 FOR UPDATE")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match stock {
                None => {
                    return Err(AppError::NotFound(format!(
                        "Product {} not found",
                        product_id
                    )))
                }
                Some(available) if available < quantity => {
                    return Err(AppError::Validation(format!(
                        "Insufficient stock for product {}: requested {}, available {}",
                        product_id, quantity, available
                    )))
                }
                Some(_) => {}
            }
        }

        let order_id: i32 = sqlx::query_scalar(
            "INSERT INTO orders (user_id, status, total_amount, payment_method) \
             VALUES ($1, 'pending', 0, $2) RETURNING id",
        )
        .bind(request.user_id)
        .bind(request.payment_method.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for line in &request.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) \
                 SELECT $1, id, $3, price FROM products WHERE id = $2",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        for (&product_id, &quantity) in &wanted {
            sqlx::query(
                "UPDATE products SET stock_quantity = stock_quantity - $2, \
                 updated_at = CURRENT_TIMESTAMP WHERE id = $1",
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE orders SET total_amount = \
             (SELECT COALESCE(SUM(price * quantity), 0) FROM order_items WHERE order_id = $1) \
             WHERE id = $1",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(order_id, user_id = request.user_id, "order created");

        self.find_order(order_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("order {} vanished after commit", order_id)))
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderWithItems>> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id",
            ORDER_ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    async fn orders_for_user(&self, user_id: i32) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }
}
