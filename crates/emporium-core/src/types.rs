//! # Domain Types
//!
//! Core domain types used throughout Emporium.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Cart       │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │1─1│  user_id (FK)   │   │  user_id (FK)   │       │
//! │  │  username       │   │  items[]        │   │  order_date     │       │
//! │  │  email, role    │   │  total_cents    │   │  total_cents    │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌────────▼────────┐       │
//! │  │    Product      │◄──│  CartLineItem   │   │   OrderLine     │       │
//! │  │  price_cents    │   │  live price     │   │  price snapshot │       │
//! │  │  stock          │   │  quantity ≥ 1   │   │  name snapshot  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders own their lines by value. Cart lines show the product's current
//! price; order lines freeze it at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization role carried in the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A registered shopper.
    User,
    /// May manage the catalog.
    Admin,
}

impl Role {
    /// Claim value used in tokens ("USER" / "ADMIN").
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// The password hash is deliberately absent: it stays in the credential
/// store and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may manage the catalog.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, copied into order lines at checkout.
    pub name: String,

    pub description: Option<String>,

    /// Current unit price in cents. Always > 0.
    pub price_cents: i64,

    /// Units available. Only checkout decrements it.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// One (product, quantity) pairing in a cart, joined with live product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    pub product_id: String,
    pub product_name: String,
    /// Current catalog price (not frozen).
    pub price_cents: i64,
    /// Always ≥ 1.
    pub quantity: i64,
}

impl CartLineItem {
    /// price × quantity at current catalog price.
    pub fn line_total(&self) -> CoreResult<Money> {
        Money::from_cents(self.price_cents)
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| CoreError::overflow(format!("line total for {}", self.product_name)))
    }
}

/// A user's single active cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLineItem>,
    /// Σ line totals at current prices.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Builds a cart view, deriving `total_cents` from the items.
    ///
    /// Fails with [`CoreError::Overflow`] when a line or the total does not
    /// fit in 64-bit cents.
    pub fn new(
        id: String,
        user_id: String,
        items: Vec<CartLineItem>,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let line_totals = items
            .iter()
            .map(CartLineItem::line_total)
            .collect::<CoreResult<Vec<Money>>>()?;
        let total =
            Money::checked_sum(line_totals).ok_or_else(|| CoreError::overflow("cart total"))?;

        Ok(Cart {
            id,
            user_id,
            items,
            total_cents: total.cents(),
            updated_at,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line of a placed order.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
}

impl OrderLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An immutable order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub username: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    /// Σ line_total_cents.
    pub total_cents: i64,
    pub items: Vec<OrderLine>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, price_cents: i64, quantity: i64) -> CartLineItem {
        CartLineItem {
            product_id: product_id.to_string(),
            product_name: format!("Product {}", product_id),
            price_cents,
            quantity,
        }
    }

    #[test]
    fn test_role_claim_round_trip() {
        assert_eq!(Role::User.as_str(), "USER");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_cart_total_is_derived() {
        let cart = Cart::new(
            "c1".to_string(),
            "u1".to_string(),
            vec![line("a", 1000, 2), line("b", 250, 3)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(cart.total_cents, 2750);
        assert_eq!(cart.items[1].line_total().unwrap().cents(), 750);
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::new("c1".to_string(), "u1".to_string(), vec![], Utc::now()).unwrap();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_cart_total_overflow_is_an_error() {
        let huge = 5_000_000_000_000_000_000;

        let err = Cart::new(
            "c1".to_string(),
            "u1".to_string(),
            vec![line("a", huge, 2)],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Overflow { .. }));

        // Each line fits, the sum does not
        let err = Cart::new(
            "c1".to_string(),
            "u1".to_string(),
            vec![line("a", huge, 1), line("b", huge, 1)],
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::overflow("cart total"));
    }

    #[test]
    fn test_cart_serializes_camel_case() {
        let cart = Cart::new(
            "c1".to_string(),
            "u1".to_string(),
            vec![line("a", 1000, 2)],
            Utc::now(),
        )
        .unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["totalCents"], 2000);
        assert_eq!(json["items"][0]["productId"], "a");
    }

    #[test]
    fn test_user_json_has_no_password_field() {
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "USER");
    }
}
