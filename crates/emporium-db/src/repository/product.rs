//! # Product Repository
//!
//! The catalog store. Reads for browsing and cart validation, inserts for
//! catalog management. Stock is never written here: only
//! [`OrderRepository::place_order`](super::order::OrderRepository::place_order)
//! decrements it.

use chrono::{DateTime, Utc};
use emporium_core::Product;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let products = db.products().list().await?;
/// let mug = db.products().get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price_cents, stock, created_at, updated_at
            FROM products
            ORDER BY name, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Gets a product by its ID, failing with NotFound.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// Price and stock bounds are enforced by CHECK constraints as well as by
    /// the validators the API runs first.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, "Product created");
        Ok(product.clone())
    }

    /// Counts catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
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
    async fn test_insert_and_get() {
        let db = fixtures::memory_db().await;
        let mug = fixtures::product(&db, "Mug", 1250, 7).await;

        let found = db.products().get(&mug.id).await.unwrap();
        assert_eq!(found.name, "Mug");
        assert_eq!(found.price_cents, 1250);
        assert_eq!(found.stock, 7);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let db = fixtures::memory_db().await;
        assert!(db.products().get_by_id(&new_id()).await.unwrap().is_none());
        assert!(matches!(
            db.products().get("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = fixtures::memory_db().await;
        fixtures::product(&db, "Teapot", 3000, 1).await;
        fixtures::product(&db, "Cup", 500, 1).await;

        let names: Vec<String> = db
            .products()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Cup", "Teapot"]);
    }

    #[tokio::test]
    async fn test_non_positive_price_violates_check() {
        let db = fixtures::memory_db().await;
        let now = Utc::now();
        let result = db
            .products()
            .insert(&Product {
                id: new_id(),
                name: "Freebie".to_string(),
                description: None,
                price_cents: 0,
                stock: 1,
                created_at: now,
                updated_at: now,
            })
            .await;

        assert!(matches!(result, Err(DbError::QueryFailed(_))));
    }
}
