//! # User Repository
//!
//! The credential store: accounts, password hashes, and the 1:1 cart that is
//! created with every account.
//!
//! Hashing happens in the API layer; this module only ever sees the hash.

use chrono::{DateTime, Utc};
use emporium_core::{Role, User};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::new_id;
use crate::error::{DbError, DbResult};

/// A user together with the stored password hash. Used only for login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_credentials(self) -> Credentials {
        Credentials {
            password_hash: self.password_hash,
            user: User {
                id: self.id,
                username: self.username,
                email: self.email,
                role: self.role,
                created_at: self.created_at,
            },
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, username, email, password_hash, role, created_at FROM users";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user and its empty cart in one transaction.
    ///
    /// ## Returns
    /// * `Ok(User)` - the stored user (no hash)
    /// * `Err(DbError::UniqueViolation)` - `field` is `"username"` or `"email"`
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> DbResult<User> {
        debug!(username = %username, "Creating user");

        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_on("users.username") => DbError::duplicate("username", username),
            err if err.is_unique_on("users.email") => DbError::duplicate("email", email),
            err => err,
        })?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(new_id())
        .bind(&user.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Gets a user by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self
            .find_credentials(username)
            .await?
            .map(|credentials| credentials.user))
    }

    /// Loads a user with its password hash, for login verification.
    pub async fn find_credentials(&self, username: &str) -> DbResult<Option<Credentials>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE username = ?1", SELECT_USER))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(UserRow::into_credentials))
    }

    /// Deletes a user. The cart and its lines go with it (cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_create_user_creates_empty_cart() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "alice").await;

        let cart = db.carts().get_cart(&user.id).await.unwrap();
        assert_eq!(cart.user_id, user.id);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let db = fixtures::memory_db().await;
        fixtures::user(&db, "alice").await;

        let err = db
            .users()
            .create("alice", "other@example.com", "hash", Role::User)
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "alice");
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = fixtures::memory_db().await;
        fixtures::user(&db, "alice").await;

        let err = db
            .users()
            .create("alicia", "alice@example.com", "hash", Role::User)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_credentials_carry_hash() {
        let db = fixtures::memory_db().await;
        db.users()
            .create("bob", "bob@example.com", "stored-hash", Role::Admin)
            .await
            .unwrap();

        let credentials = db.users().find_credentials("bob").await.unwrap().unwrap();
        assert_eq!(credentials.password_hash, "stored-hash");
        assert_eq!(credentials.user.role, Role::Admin);

        assert!(db.users().find_credentials("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_username_missing() {
        let db = fixtures::memory_db().await;
        assert!(db.users().find_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_cart() {
        let db = fixtures::memory_db().await;
        let user = fixtures::user(&db, "carol").await;

        db.users().delete(&user.id).await.unwrap();

        assert!(db.users().find_by_username("carol").await.unwrap().is_none());
        let err = db.carts().get_cart(&user.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
