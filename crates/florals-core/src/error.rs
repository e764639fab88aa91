//! # Error Types
//!
//! Domain-specific error types for florals-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  florals-core errors (this file)                                        │
//! │  ├── CoreError        - Cart, pricing and checkout rule violations      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  florals-db errors (separate crate)                                     │
//! │  └── DbError          - Storage operation failures                      │
//! │                                                                         │
//! │  Storefront app errors                                                  │
//! │  └── ApiError         - What the front end sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::Size;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Quantity passed to add-item is zero or negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 0)
    ///      │
    ///      ▼
    /// InvalidQuantity(0)
    ///      │
    ///      ▼
    /// UI shows: "Quantity must be at least 1"
    /// ```
    #[error("Invalid quantity {0}: must be at least 1")]
    InvalidQuantity(i64),

    /// The product has no flat price and no size prices at all.
    #[error("No price available for product {product_id} at size {size}")]
    PriceUnavailable { product_id: String, size: Size },

    /// Line quantity would exceed the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart already holds the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Gateway confirmation does not match the order being placed.
    #[error("Payment mismatch: {reason}")]
    PaymentMismatch { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PriceUnavailable {
            product_id: "rose-bouquet".to_string(),
            size: Size::Large,
        };
        assert_eq!(
            err.to_string(),
            "No price available for product rose-bouquet at size large"
        );

        assert_eq!(
            CoreError::InvalidQuantity(0).to_string(),
            "Invalid quantity 0: must be at least 1"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooShort {
            field: "firstName".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "firstName must be at least 2 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
