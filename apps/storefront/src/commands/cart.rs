//! # Cart Commands
//!
//! Cart manipulation for the front end.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │ (payment)│     │  placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   add_to_cart                       place_order         │
//! │                   update_cart_item                  (clears cart)       │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────► (back to empty)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command that takes an optional `size` acts on that size variant
//! only when given, and on every line of the product otherwise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;
use florals_core::checkout::CheckoutSummary;
use florals_core::{Cart, CartLineItem, CartTotals, Size};

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    /// Shipping, tax and grand total at today's rules.
    pub summary: CheckoutSummary,
}

impl CartResponse {
    fn build(state: &AppState, cart: &Cart) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            totals: CartTotals::from(cart),
            summary: CheckoutSummary::for_cart(cart, &state.config.checkout),
        }
    }
}

async fn respond(state: &AppState) -> CartResponse {
    CartResponse::build(state, &state.cart.snapshot().await)
}

/// Current cart contents.
pub async fn get_cart(state: &AppState) -> CartResponse {
    debug!("get_cart command");
    respond(state).await
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Same product and size already in cart: quantity increases
/// - Otherwise: new line, price frozen now
/// - `quantity` defaults to 1, `size` to medium
///
/// ## User Workflow
/// ```text
/// Product page ──► choose size ──► "Add to cart"
///        │
///        ▼
/// add_to_cart { productId, quantity: 1, size: "large" }
///        │
///        ├── catalog lookup (NOT_FOUND if unknown)
///        ├── price resolution (CART_ERROR if unpriced)
///        └── persisted, totals pushed to subscribers
/// ```
pub async fn add_to_cart(
    state: &AppState,
    product_id: &str,
    quantity: Option<i64>,
    size: Option<Size>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    let size = size.unwrap_or_default();
    debug!(product_id = %product_id, quantity, size = %size, "add_to_cart command");

    let product = state.catalog.require(product_id)?;
    state.cart.add_item(product, quantity, size).await?;
    Ok(respond(state).await)
}

/// Sets a quantity; 0 or less removes.
pub async fn update_cart_item(
    state: &AppState,
    product_id: &str,
    quantity: i64,
    size: Option<Size>,
) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, quantity, ?size, "update_cart_item command");

    match size {
        Some(size) => state.cart.update_variant_quantity(product_id, size, quantity).await?,
        None => state.cart.update_quantity(product_id, quantity).await?,
    };
    Ok(respond(state).await)
}

/// Removes a product (or one size of it).
pub async fn remove_from_cart(
    state: &AppState,
    product_id: &str,
    size: Option<Size>,
) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, ?size, "remove_from_cart command");

    match size {
        Some(size) => state.cart.remove_variant(product_id, size).await?,
        None => state.cart.remove_item(product_id).await?,
    };
    Ok(respond(state).await)
}

/// Empties the cart.
pub async fn clear_cart(state: &AppState) -> ApiResult<CartResponse> {
    debug!("clear_cart command");
    state.cart.clear().await?;
    Ok(respond(state).await)
}
