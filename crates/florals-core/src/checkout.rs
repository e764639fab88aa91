//! # Checkout
//!
//! Order totals and order construction from a paid cart.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart ──► CheckoutSummary::for_cart                                     │
//! │             subtotal  = Σ line totals                                   │
//! │             shipping  = tiered on subtotal                              │
//! │             tax       = flat                                            │
//! │             total     = subtotal + shipping + tax                       │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │           Payment gateway (amount = total, in pesewas)                  │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  build_order(cart, address, PaymentConfirmation)                        │
//! │    ├── cart not empty                                                   │
//! │    ├── address valid                                                    │
//! │    ├── paid amount and currency match the summary                       │
//! │    └── Order { status: confirmed, payment: paid }                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shipping Tiers (defaults)
//! | subtotal          | shipping   |
//! |-------------------|------------|
//! | ≥ GH₵75.00        | free       |
//! | ≥ GH₵50.00        | GH₵5.99    |
//! | otherwise         | GH₵9.99    |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, CURRENCY_CODE};
use crate::types::{
    Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
};
use crate::validation::validate_shipping_address;

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "BB";

/// Storage key prefix for placed orders.
pub const ORDER_KEY_PREFIX: &str = "order-";

/// Storage key of an order.
pub fn order_storage_key(order_id: &str) -> String {
    format!("{}{}", ORDER_KEY_PREFIX, order_id)
}

// =============================================================================
// Rules
// =============================================================================

/// Shipping tiers and tax. Thresholds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRules {
    pub free_shipping_threshold: Money,
    pub reduced_shipping_threshold: Money,
    pub reduced_shipping_fee: Money,
    pub standard_shipping_fee: Money,
    pub flat_tax: Money,
}

impl Default for CheckoutRules {
    fn default() -> Self {
        CheckoutRules {
            free_shipping_threshold: Money::from_major(75),
            reduced_shipping_threshold: Money::from_major(50),
            reduced_shipping_fee: Money::from_minor(599),
            standard_shipping_fee: Money::from_minor(999),
            flat_tax: Money::from_major(20),
        }
    }
}

impl CheckoutRules {
    /// Shipping fee for a subtotal.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_shipping_threshold {
            Money::zero()
        } else if subtotal >= self.reduced_shipping_threshold {
            self.reduced_shipping_fee
        } else {
            self.standard_shipping_fee
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Totals shown on the checkout page and charged by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl CheckoutSummary {
    pub fn for_cart(cart: &Cart, rules: &CheckoutRules) -> Self {
        let subtotal = cart.total();
        let shipping = rules.shipping_for(subtotal);
        let tax = rules.flat_tax;
        CheckoutSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// What the payment gateway reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    /// Gateway transaction reference.
    pub reference: String,
    /// Amount charged.
    pub amount: Money,
    /// ISO currency code, e.g. "GHS".
    pub currency: String,
}

impl PaymentConfirmation {
    /// Confirmation for exactly `amount` in the store currency.
    pub fn new(reference: impl Into<String>, amount: Money) -> Self {
        PaymentConfirmation {
            reference: reference.into(),
            amount,
            currency: CURRENCY_CODE.to_string(),
        }
    }
}

// =============================================================================
// Order Construction
// =============================================================================

/// Builds a confirmed, paid order from the cart.
///
/// The cart is not modified; clearing it is the caller's job once the order
/// is stored.
///
/// ## Errors
/// - `EmptyCart` when there is nothing to order
/// - `Validation` when the shipping address fails its rules
/// - `PaymentMismatch` when the paid amount or currency differ from the
///   summary total
pub fn build_order(
    cart: &Cart,
    address: &ShippingAddress,
    payment: &PaymentConfirmation,
    rules: &CheckoutRules,
    now: DateTime<Utc>,
) -> CoreResult<Order> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    validate_shipping_address(address)?;

    let summary = CheckoutSummary::for_cart(cart, rules);

    if !payment.currency.eq_ignore_ascii_case(CURRENCY_CODE) {
        return Err(CoreError::PaymentMismatch {
            reason: format!("expected currency {}, got {}", CURRENCY_CODE, payment.currency),
        });
    }

    if payment.amount != summary.total {
        return Err(CoreError::PaymentMismatch {
            reason: format!("expected {}, got {}", summary.total, payment.amount),
        });
    }

    if payment.reference.trim().is_empty() {
        return Err(CoreError::PaymentMismatch {
            reason: "missing payment reference".to_string(),
        });
    }

    let items = cart
        .items()
        .iter()
        .map(|line| OrderItem {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            product_image: line.product.image.clone(),
            size: line.selected_size,
            quantity: line.quantity,
            price: line.unit_price(),
            total: line.line_total(),
        })
        .collect();

    Ok(Order {
        id: Uuid::new_v4().to_string(),
        order_number: generate_order_number(now),
        items,
        shipping_address: address.clone(),
        subtotal: summary.subtotal,
        shipping: summary.shipping,
        tax: summary.tax,
        total: summary.total,
        status: OrderStatus::Confirmed,
        payment_method: PaymentMethod::Paystack,
        payment_status: PaymentStatus::Paid,
        payment_reference: Some(payment.reference.trim().to_string()),
        created_at: now,
        updated_at: now,
    })
}

/// Human-readable order number: `BB-{millis base36}-{5 random base36}`.
///
/// Format: `BB-LXK2M9QZ-4FJ0A`
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u128;
    let random = u128::from_be_bytes(*Uuid::new_v4().as_bytes());

    let mut suffix = to_base36(random);
    suffix.truncate(5);

    format!("{}-{}-{:0>5}", ORDER_NUMBER_PREFIX, to_base36(millis), suffix)
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================
