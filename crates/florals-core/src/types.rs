//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │ ShippingAddress │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (slug)      │   │  id (UUID)      │   │  name, email    │       │
//! │  │  price | prices │   │  order_number   │   │  phone, address │       │
//! │  │  in_stock       │   │  totals, status │   │  city, country  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Size       │   │   OrderStatus   │   │  PaymentStatus  │       │
//! │  │  small          │   │  pending        │   │  pending        │       │
//! │  │  medium         │   │  confirmed      │   │  paid           │       │
//! │  │  large          │   │  shipped  ...   │   │  failed  ...    │       │
//! │  │  extraLarge     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders carry both:
//! - `id`: UUID v4, used as the storage key
//! - `order_number`: human-readable reference shown to the customer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Size
// =============================================================================

/// Arrangement size variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl Size {
    /// All sizes, smallest first.
    pub const ALL: [Size; 4] = [Size::Small, Size::Medium, Size::Large, Size::ExtraLarge];

    /// Wire name, as used in line item ids and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::ExtraLarge => "extraLarge",
        }
    }

    /// Parses a wire name. Accepts `extra-large` and `xl` as aliases.
    pub fn parse(s: &str) -> Option<Size> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "s" => Some(Size::Small),
            "medium" | "m" => Some(Size::Medium),
            "large" | "l" => Some(Size::Large),
            "extralarge" | "extra-large" | "xl" => Some(Size::ExtraLarge),
            _ => None,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// A product is priced either with a flat `price`, a per-size `prices`
/// table, or both. Price resolution lives in [`crate::pricing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier (slug-like, stable).
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Flat price, when the product is not priced per size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,

    /// Per-size prices. Sizes may be missing.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prices: BTreeMap<Size, Money>,

    /// Pre-discount price shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,

    /// Image path relative to the public asset root.
    #[serde(default)]
    pub image: String,

    /// Category slug (see [`crate::catalog::CATEGORIES`]).
    pub category: String,

    /// Availability flag shown in the shop.
    pub in_stock: bool,

    /// Units on hand.
    #[serde(default)]
    pub stock: i64,

    /// Average rating, 0.0 - 5.0.
    #[serde(default)]
    pub rating: f32,

    #[serde(default)]
    pub tags: Vec<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can be ordered right now.
    pub fn can_order(&self, quantity: i64) -> bool {
        self.in_stock && self.stock >= quantity
    }

    /// Whether the product is priced per size.
    pub fn has_size_prices(&self) -> bool {
        !self.prices.is_empty()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A browsing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub slug: String,
}

// =============================================================================
// Shipping Address
// =============================================================================

/// Delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

// =============================================================================
// Payment
// =============================================================================

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Payment provider that settled the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paystack hosted checkout (cards, mobile money).
    #[default]
    Paystack,
}

// =============================================================================
// Order
// =============================================================================

/// A line of a placed order.
/// Snapshot pattern: product data is frozen at time of purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub size: Size,
    pub quantity: i64,
    /// Unit price paid.
    pub price: Money,
    /// price × quantity.
    pub total: Money,
}

/// A placed order, written to storage under `order-{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Gateway transaction reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
