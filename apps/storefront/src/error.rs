//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Command Function  → Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── CoreError      (rules: quantity, price, payment) ──┐        │
//! │         ├── DbError        (storage)                         ──┤        │
//! │         ├── CartStoreError (either of the above)             ──┼──► ApiError
//! │         └── ConfigError    (startup)                         ──┘        │
//! │                                                                         │
//! │  Front end / CLI receives:                                              │
//! │    { "code": "CART_ERROR", "message": "Cart is empty" }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;

use crate::state::{CartStoreError, ConfigError};
use florals_core::CoreError;
use florals_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: tulip-tower"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, order or other resource missing
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Storage operation failed
    DatabaseError,

    /// Cart rule rejected the operation
    CartError,

    /// Payment confirmation did not match the order
    PaymentError,

    /// Anything else
    Internal,
}

/// Result alias for commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // log the detail, return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored document unreadable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InvalidQuantity(_)
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ApiError::new(ErrorCode::ValidationError, message),
            CoreError::PriceUnavailable { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, message),
            CoreError::PaymentMismatch { .. } => ApiError::new(ErrorCode::PaymentError, message),
        }
    }
}

impl From<CartStoreError> for ApiError {
    fn from(err: CartStoreError) -> Self {
        match err {
            CartStoreError::Rule(e) => e.into(),
            CartStoreError::Storage(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::Internal, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use florals_core::ValidationError;

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::EmptyCart);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CART_ERROR");
        assert_eq!(json["message"], "Cart is empty");
    }

    #[test]
    fn test_core_error_codes() {
        assert_eq!(
            ApiError::from(CoreError::ProductNotFound("x".into())).code,
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(CoreError::InvalidQuantity(0)).code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            ApiError::from(CoreError::PaymentMismatch { reason: "short".into() }).code,
            ErrorCode::PaymentError
        );
        assert_eq!(
            ApiError::from(CoreError::Validation(ValidationError::Required {
                field: "city".into()
            }))
            .message,
            "Validation error: city is required"
        );
    }

    #[test]
    fn test_db_error_codes() {
        let err = ApiError::from(DbError::not_found("Order", "abc"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: abc");

        let err = ApiError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_store_error_delegates() {
        let err = ApiError::from(CartStoreError::Rule(CoreError::CartTooLarge { max: 100 }));
        assert_eq!(err.code, ErrorCode::CartError);
        let err = ApiError::from(CartStoreError::Storage(DbError::PoolExhausted));
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
