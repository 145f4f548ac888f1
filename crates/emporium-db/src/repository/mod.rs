//! # Repository Module
//!
//! Database repository implementations for Emporium.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Route handler                                                         │
//! │       │  db.carts().add_item(user_id, product_id, 2)                   │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐ ┌──────────────────┐                             │
//! │  │ UserRepository   │ │ ProductRepository│  single-table reads/writes  │
//! │  │ register, login  │ │ list, get, insert│                             │
//! │  └──────────────────┘ └──────────────────┘                             │
//! │  ┌──────────────────┐ ┌──────────────────┐                             │
//! │  │ CartRepository   │ │ OrderRepository  │  multi-statement            │
//! │  │ add/remove/get   │ │ place_order, list│  transactions               │
//! │  └──────────────────┘ └──────────────────┘                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Credential store
//! - [`ProductRepository`](product::ProductRepository) - Catalog store
//! - [`CartRepository`](cart::CartRepository) - Cart engine
//! - [`OrderRepository`](order::OrderRepository) - Order engine

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

/// Generates a new entity ID (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Test fixtures shared by the repository tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use emporium_core::{Product, Role, User};

    use super::new_id;
    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn user(db: &Database, username: &str) -> User {
        db.users()
            .create(
                username,
                &format!("{}@example.com", username),
                "$argon2id$not-a-real-hash",
                Role::User,
            )
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: new_id(),
                name: name.to_string(),
                description: None,
                price_cents,
                stock,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }
}
