//! # Cart Repository
//!
//! The cart engine: one cart per user, one line per (cart, product).
//!
//! ## Add Item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(user, product, qty)                                           │
//! │       │                                                                 │
//! │       ├── qty <= 0 ──────────────────────────► Rejected(Validation)     │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  UPDATE carts SET updated_at ... RETURNING id   (takes the write lock)  │
//! │       ├── no row ────────────────────────────► NotFound(Cart)           │
//! │       ▼                                                                 │
//! │  product exists? ────────────────────────────► NotFound(Product)        │
//! │       ▼                                                                 │
//! │  merged = existing + qty (checked) ──────────► Rejected(Overflow)       │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT (cart_id, product_id)                           │
//! │         DO UPDATE SET quantity = excluded.quantity                      │
//! │       ▼                                                                 │
//! │  reload cart, totals checked ────────────────► Rejected(Overflow)       │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is not checked here; checkout does that.

use chrono::{DateTime, Utc};
use emporium_core::validation::validate_quantity;
use emporium_core::{Cart, CartLineItem, CoreError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    user_id: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: String,
    product_name: String,
    price_cents: i64,
    quantity: i64,
}

impl From<CartLineRow> for CartLineItem {
    fn from(row: CartLineRow) -> Self {
        CartLineItem {
            product_id: row.product_id,
            product_name: row.product_name,
            price_cents: row.price_cents,
            quantity: row.quantity,
        }
    }
}

/// Loads a user's cart with its lines on an existing connection or transaction.
async fn load_cart(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Option<Cart>> {
    let cart: Option<CartRow> =
        sqlx::query_as("SELECT id, user_id, updated_at FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(cart) = cart else {
        return Ok(None);
    };

    let lines: Vec<CartLineRow> = sqlx::query_as(
        r#"
        SELECT ci.product_id, p.name AS product_name, p.price_cents, ci.quantity
        FROM cart_items ci
        INNER JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = ?1
        ORDER BY ci.added_at, ci.rowid
        "#,
    )
    .bind(&cart.id)
    .fetch_all(&mut *conn)
    .await?;

    let cart = Cart::new(
        cart.id,
        cart.user_id,
        lines.into_iter().map(CartLineItem::from).collect(),
        cart.updated_at,
    )?;

    Ok(Some(cart))
}

/// Bumps `updated_at` on the user's cart and returns its id.
///
/// Being a write, this takes SQLite's write lock for the rest of the
/// transaction, so reads that follow see the latest committed state.
pub(crate) async fn lock_cart(
    conn: &mut SqliteConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> DbResult<Option<String>> {
    let cart_id: Option<String> =
        sqlx::query_scalar("UPDATE carts SET updated_at = ?1 WHERE user_id = ?2 RETURNING id")
            .bind(now)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(cart_id)
}

/// Repository for cart operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Returns the user's cart (possibly empty).
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the user has no cart record
    pub async fn get_cart(&self, user_id: &str) -> DbResult<Cart> {
        let mut conn = self.pool.acquire().await?;
        load_cart(&mut conn, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))
    }

    /// Adds `quantity` units of a product, merging with an existing line.
    pub async fn add_item(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<Cart> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        debug!(user_id = %user_id, product_id = %product_id, quantity, "Adding item to cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let cart_id = lock_cart(&mut tx, user_id, now)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        let product_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

        if product_exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        // The cart row lock is held, so the line cannot change under us
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE cart_id = ?1 AND product_id = ?2",
        )
        .bind(&cart_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let merged = existing
            .unwrap_or(0)
            .checked_add(quantity)
            .ok_or_else(|| CoreError::overflow("quantity"))?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, added_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(&cart_id)
        .bind(product_id)
        .bind(merged)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // An overflowing total fails here and dropping `tx` undoes the insert
        let cart = load_cart(&mut tx, user_id)
            .await
            .inspect_err(|e| warn!(user_id = %user_id, error = %e, "Cart update rejected"))?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(cart_id = %cart.id, total = %cart.total(), "Cart updated");
        Ok(cart)
    }

    /// Removes a product's line from the user's cart.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no cart, or the product is not in it
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> DbResult<Cart> {
        debug!(user_id = %user_id, product_id = %product_id, "Removing item from cart");

        let mut tx = self.pool.begin().await?;

        let cart_id = lock_cart(&mut tx, user_id, Utc::now())
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
            .bind(&cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back the updated_at bump
            return Err(DbError::not_found("Product in cart", product_id));
        }

        let cart = load_cart(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(cart)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{fixtures, new_id};

    #[tokio::test]
    async fn test_add_same_product_twice_merges_quantity() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;

        db.carts().add_item(&user.id, &mug.id, 2).await.unwrap();
        let cart = db.carts().add_item(&user.id, &mug.id, 3).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total_cents, 5000);
    }

    #[tokio::test]
    async fn test_add_does_not_check_stock() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 1).await;

        let cart = db.carts().add_item(&user.id, &mug.id, 50).await.unwrap();
        assert_eq!(cart.items[0].quantity, 50);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;

        let err = db.carts().add_item(&user.id, &new_id(), 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));
        assert!(db.carts().get_cart(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_without_cart_fails() {
        let db = fixtures::memory_db().await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;

        let err = db.carts().add_item(&new_id(), &mug.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Cart"));
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;

        for qty in [0, -3] {
            let err = db.carts().add_item(&user.id, &mug.id, qty).await.unwrap_err();
            assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));
        }
        assert!(db.carts().get_cart(&user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_large_quantity_is_accepted() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;

        let cart = db.carts().add_item(&user.id, &mug.id, 1_000_000).await.unwrap();
        assert_eq!(cart.items[0].quantity, 1_000_000);
        assert_eq!(cart.total_cents, 1_000_000_000);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_rejected_and_rolled_back() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let gem = fixtures::product(&db, "Gem", 5_000_000_000_000_000_000, 5).await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;

        let err = db.carts().add_item(&user.id, &gem.id, 2).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Overflow { .. })));
        assert!(db.carts().get_cart(&user.id).await.unwrap().is_empty());

        // Line fits on its own, but an existing line's merge would overflow
        let before = db.carts().add_item(&user.id, &gem.id, 1).await.unwrap();
        let err = db.carts().add_item(&user.id, &gem.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Overflow { .. })));
        assert_eq!(db.carts().get_cart(&user.id).await.unwrap(), before);

        // Adding mugs would push the total past the limit too
        let err = db.carts().add_item(&user.id, &mug.id, i64::MAX / 1000).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Overflow { .. })));
        assert_eq!(db.carts().get_cart(&user.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_merged_quantity_overflow_is_rejected() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let pin = fixtures::product(&db, "Pin", 1, 5).await;

        let before = db.carts().add_item(&user.id, &pin.id, i64::MAX - 1).await.unwrap();
        let err = db.carts().add_item(&user.id, &pin.id, 2).await.unwrap_err();

        assert!(
            matches!(err, DbError::Rejected(CoreError::Overflow { ref field }) if field == "quantity")
        );
        assert_eq!(db.carts().get_cart(&user.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;
        let pot = fixtures::product(&db, "Teapot", 3000, 5).await;

        db.carts().add_item(&user.id, &mug.id, 1).await.unwrap();
        db.carts().add_item(&user.id, &pot.id, 1).await.unwrap();

        let cart = db.carts().remove_item(&user.id, &mug.id).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, pot.id);
        assert_eq!(cart.total_cents, 3000);
    }

    #[tokio::test]
    async fn test_remove_absent_product_leaves_cart_unchanged() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;
        let pot = fixtures::product(&db, "Teapot", 3000, 5).await;

        let before = db.carts().add_item(&user.id, &mug.id, 2).await.unwrap();

        let err = db.carts().remove_item(&user.id, &pot.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let after = db.carts().get_cart(&user.id).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_cart_shows_current_price() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;
        let mug = fixtures::product(&db, "Mug", 1000, 5).await;
        db.carts().add_item(&user.id, &mug.id, 2).await.unwrap();

        sqlx::query("UPDATE products SET price_cents = 1500 WHERE id = ?1")
            .bind(&mug.id)
            .execute(db.pool())
            .await
            .unwrap();

        let cart = db.carts().get_cart(&user.id).await.unwrap();
        assert_eq!(cart.total_cents, 3000);
    }
}
