//! # Validation Module
//!
//! Input validation for cart operations and checkout.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                 │
//! │  └── Immediate feedback while typing                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Quantities before they reach the cart                              │
//! │  └── Shipping address before an order is written                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (key/value, schema-less)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::ShippingAddress;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ```rust
/// use florals_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog search query. Empty is allowed.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, a non-empty local part and a dotted
/// domain. The gateway and mail provider do the real verification.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

fn min_len(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let len = value.trim().chars().count();
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
    Ok(())
}

/// Validates the checkout delivery details.
///
/// ## Rules
/// | field       | rule           |
/// |-------------|----------------|
/// | firstName   | ≥ 2 chars      |
/// | lastName    | ≥ 2 chars      |
/// | email       | valid address  |
/// | phone       | ≥ 10 chars     |
/// | address     | ≥ 5 chars      |
/// | city        | ≥ 2 chars      |
/// | zipCode     | ≥ 5 chars      |
/// | country     | ≥ 2 chars      |
///
/// `state` is optional and unchecked. The first failing field is reported.
pub fn validate_shipping_address(address: &ShippingAddress) -> ValidationResult<()> {
    min_len("firstName", &address.first_name, 2)?;
    min_len("lastName", &address.last_name, 2)?;
    validate_email(&address.email)?;
    min_len("phone", &address.phone, 10)?;
    min_len("address", &address.address, 5)?;
    min_len("city", &address.city, 2)?;
    min_len("zipCode", &address.zip_code, 5)?;
    min_len("country", &address.country, 2)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
