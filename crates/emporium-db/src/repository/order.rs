//! # Order Repository
//!
//! The order engine: turns a user's cart into an immutable order.
//!
//! ## Placing an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_order(user_id)                         one transaction           │
//! │                                                                         │
//! │  1. lock_cart()            write first; later writers wait here         │
//! │  2. snapshot cart lines    JOIN products for name, price, stock         │
//! │  3. plan_checkout()        EmptyCart / InsufficientStock / Overflow     │
//! │  4. INSERT orders + order_lines (prices frozen)                         │
//! │  5. UPDATE products SET stock = stock - n WHERE stock >= n              │
//! │  6. DELETE cart_items                                                   │
//! │  7. COMMIT                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error between BEGIN and COMMIT drops the transaction, so stock, cart
//! and orders are left exactly as they were.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use emporium_core::checkout::{self, CartSnapshotLine};
use emporium_core::{CoreError, Order, OrderLine};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::cart::lock_cart;
use super::new_id;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    product_id: String,
    product_name: String,
    unit_price_cents: i64,
    quantity: i64,
    available_stock: i64,
}

impl From<SnapshotRow> for CartSnapshotLine {
    fn from(row: SnapshotRow) -> Self {
        CartSnapshotLine {
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            available_stock: row.available_stock,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    username: String,
    order_date: DateTime<Utc>,
    total_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: String,
    product_id: String,
    product_name: String,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            line_total_cents: row.line_total_cents,
        }
    }
}

async fn username_of(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Option<String>> {
    let username: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(username)
}

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Converts the user's cart into an order.
    ///
    /// ## Returns
    /// * `Ok(Order)` - stock decremented, cart emptied
    /// * `Err(DbError::NotFound)` - unknown user, or the user has no cart
    /// * `Err(DbError::Rejected(EmptyCart))` - nothing to order
    /// * `Err(DbError::Rejected(InsufficientStock))` - nothing was changed
    pub async fn place_order(&self, user_id: &str) -> DbResult<Order> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let Some(cart_id) = lock_cart(&mut tx, user_id, now).await? else {
            return Err(match username_of(&mut tx, user_id).await? {
                Some(_) => DbError::not_found("Cart", user_id),
                None => DbError::not_found("User", user_id),
            });
        };

        let username = username_of(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        let snapshot: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT ci.product_id,
                   p.name        AS product_name,
                   p.price_cents AS unit_price_cents,
                   ci.quantity,
                   p.stock       AS available_stock
            FROM cart_items ci
            INNER JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?1
            ORDER BY ci.added_at, ci.rowid
            "#,
        )
        .bind(&cart_id)
        .fetch_all(&mut *tx)
        .await?;

        let snapshot: Vec<CartSnapshotLine> =
            snapshot.into_iter().map(CartSnapshotLine::from).collect();

        let plan = checkout::plan_checkout(&snapshot).inspect_err(|e| {
            debug!(user_id = %user_id, error = %e, "Checkout rejected");
        })?;

        let order = Order {
            id: new_id(),
            user_id: user_id.to_string(),
            username,
            order_date: now,
            total_cents: plan.total.cents(),
            items: plan.lines,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, order_date, total_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.order_date)
        .bind(order.total_cents)
        .execute(&mut *tx)
        .await?;

        for (line_no, line) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (order_id, line_no, product_id, product_name, unit_price_cents, quantity, line_total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&order.id)
            .bind(line_no as i64 + 1)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        for demand in &plan.demand {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?3
                WHERE id = ?2 AND stock >= ?1
                "#,
            )
            .bind(demand.requested)
            .bind(&demand.product_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Only reachable if stock moved after the snapshot
                let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(&demand.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

                warn!(product_id = %demand.product_id, available, "Stock changed during checkout");
                return Err(CoreError::InsufficientStock {
                    product: demand.product_name.clone(),
                    requested: demand.requested,
                    available,
                }
                .into());
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total(),
            lines = order.items.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Lists a user's orders, newest first.
    ///
    /// An existing user with no orders gets an empty list.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;

        if username_of(&mut conn, user_id).await?.is_none() {
            return Err(DbError::not_found("User", user_id));
        }

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, u.username, o.order_date, o.total_cents
            FROM orders o
            INNER JOIN users u ON u.id = o.user_id
            WHERE o.user_id = ?1
            ORDER BY o.order_date DESC, o.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let lines: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT ol.order_id, ol.product_id, ol.product_name,
                   ol.unit_price_cents, ol.quantity, ol.line_total_cents
            FROM order_lines ol
            INNER JOIN orders o ON o.id = ol.order_id
            WHERE o.user_id = ?1
            ORDER BY ol.order_id, ol.line_no
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order
                .entry(line.order_id.clone())
                .or_default()
                .push(OrderLine::from(line));
        }

        debug!(user_id = %user_id, count = rows.len(), "Listed orders");

        Ok(rows
            .into_iter()
            .map(|row| Order {
                items: by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                username: row.username,
                order_date: row.order_date,
                total_cents: row.total_cents,
            })
            .collect())
    }

    /// Gets one of the user's orders.
    ///
    /// Another user's order is reported as not found.
    pub async fn get_for_user(&self, user_id: &str, order_id: &str) -> DbResult<Order> {
        let mut conn = self.pool.acquire().await?;

        let row: OrderRow = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, u.username, o.order_date, o.total_cents
            FROM orders o
            INNER JOIN users u ON u.id = o.user_id
            WHERE o.id = ?1 AND o.user_id = ?2
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let lines: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT order_id, product_id, product_name,
                   unit_price_cents, quantity, line_total_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            order_date: row.order_date,
            total_cents: row.total_cents,
            items: lines.into_iter().map(OrderLine::from).collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
