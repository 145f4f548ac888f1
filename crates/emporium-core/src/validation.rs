//! # Validation Module
//!
//! Input validation rules for Emporium.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor                                               │
//! │  └── JSON shape and types (serde)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Route handler                                                │
//! │  └── THIS MODULE: field rules (lengths, ranges, formats)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (username, email, cart per user, product per cart)         │
//! │  └── CHECK (price > 0, stock ≥ 0, quantity ≥ 1)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use emporium_core::validation::{validate_quantity, validate_username};
//!
//! assert!(validate_username("alice").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;
pub const EMAIL_MAX: usize = 100;
pub const PRODUCT_NAME_MIN: usize = 2;
pub const PRODUCT_NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

// =============================================================================
// Shared helpers
// =============================================================================

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - Must not be blank
/// - 3 to 50 characters
/// - No whitespace
pub fn validate_username(username: &str) -> ValidationResult<()> {
    check_length("username", username.trim(), USERNAME_MIN, USERNAME_MAX)?;

    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - 6 to 128 characters (whitespace counts)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    check_length("password", password, PASSWORD_MIN, PASSWORD_MAX)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be blank, at most 100 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain has a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use emporium_core::validation::validate_email;
///
/// assert!(validate_email("alice@example.com").is_ok());
/// assert!(validate_email("alice@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    check_length("email", email, 1, EMAIL_MAX)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have exactly one '@' with a local part"));
    }

    let dot_ok = domain
        .rfind('.')
        .map(|pos| pos > 0 && pos < domain.len() - 1)
        .unwrap_or(false);

    if !dot_ok || domain.starts_with('.') || domain.contains("..") {
        return Err(invalid("must have a valid domain"));
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name (2 to 100 characters, not blank).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    check_length("name", name.trim(), PRODUCT_NAME_MIN, PRODUCT_NAME_MAX)
}

/// Validates an optional product description (at most 500 characters).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX => Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: DESCRIPTION_MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be strictly positive (free products are not sold here)
///
/// ## Example
/// ```rust
/// use emporium_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an initial stock level (≥ 0).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a quantity for an add-to-cart call.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// POST /api/cart/add {"quantity": 0}
///       │
///       ▼
/// validate_quantity(0) ← THIS FUNCTION
///       │
///       ├── qty <= 0?  → 400 "quantity must be greater than zero"
///       └── OK → CartRepository::add_item (overflow checked there)
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use emporium_core::validation::validate_uuid;
///
/// assert!(validate_uuid("productId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("productId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());

        assert!(matches!(
            validate_username("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_username("ab"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@shop.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@@example.com").is_err());
        assert!(validate_email("a@example").is_err());
        assert!(validate_email("a@example.").is_err());
        assert!(validate_email("a@.com").is_err());
        assert!(validate_email("a b@example.com").is_err());

        let long = format!("{}@example.com", "a".repeat(95));
        assert!(matches!(
            validate_email(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_product_fields() {
        assert!(validate_product_name("Mug").is_ok());
        assert!(validate_product_name("M").is_err());
        assert!(validate_product_name(&"M".repeat(101)).is_err());

        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("short")).is_ok());
        assert!(validate_description(Some(&"d".repeat(501))).is_err());

        assert!(validate_price_cents(1).is_ok());
        assert!(validate_price_cents(0).is_err());
        assert!(validate_price_cents(-5).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(i64::MAX).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
