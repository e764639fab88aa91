//! # Checkout Commands
//!
//! Totals for the checkout page and order placement once the payment
//! gateway has confirmed the charge.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout_summary ──► amount shown and charged by the gateway           │
//! │                                                                         │
//! │  gateway callback ──► place_order { shippingAddress, payment }          │
//! │                              │                                          │
//! │                              ├── cart locked                            │
//! │                              ├── build_order (address, payment checks)  │
//! │                              ├── order-{id} + empty cart, one txn       │
//! │                              └── cart cleared, totals published         │
//! │                                                                         │
//! │  Any failure leaves the cart exactly as it was.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::AppState;
use florals_core::checkout::{build_order, CheckoutSummary, PaymentConfirmation};
use florals_core::{Order, ShippingAddress};

/// Body of a place-order call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment: PaymentConfirmation,
}

/// Subtotal, shipping, tax and total for the current cart.
pub async fn checkout_summary(state: &AppState) -> CheckoutSummary {
    let cart = state.cart.snapshot().await;
    CheckoutSummary::for_cart(&cart, &state.config.checkout)
}

/// Records a paid order and empties the cart.
///
/// ## Errors
/// - `CART_ERROR` when the cart is empty
/// - `VALIDATION_ERROR` when the address fails its rules
/// - `PAYMENT_ERROR` when the payment does not match the total
/// - `DATABASE_ERROR` when the order could not be stored
pub async fn place_order(state: &AppState, request: PlaceOrderRequest) -> ApiResult<Order> {
    let PlaceOrderRequest {
        shipping_address,
        payment,
    } = request;
    debug!(reference = %payment.reference, amount = %payment.amount, "place_order command");

    let rules = state.config.checkout;
    let result = state
        .cart
        .place_order(&state.db.orders(), |cart| {
            build_order(cart, &shipping_address, &payment, &rules, Utc::now())
        })
        .await;

    match result {
        Ok(order) => {
            info!(
                order_id = %order.id,
                order_number = %order.order_number,
                total = %order.total,
                items = order.item_count(),
                "Checkout complete"
            );
            Ok(order)
        }
        Err(e) => {
            warn!(error = %e, reference = %payment.reference, "Order rejected");
            Err(e.into())
        }
    }
}
