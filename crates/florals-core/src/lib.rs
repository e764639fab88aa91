//! # florals-core: Storefront Business Logic for Rehoboth Florals
//!
//! Cart rules, price resolution, checkout totals and the product catalog,
//! as plain functions over plain data. Nothing in here touches storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rehoboth Florals Storefront                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 florals CLI / storefront state                  │   │
//! │  │    browse ──► add to cart ──► checkout ──► order lookup         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ florals-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │ catalog │ │ pricing │ │  cart   │ │ checkout │ │  money │  │   │
//! │  │   │ filters │ │  sizes  │ │  lines  │ │ shipping │ │  GHS   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              florals-db (key/value persistence)                 │   │
//! │  │            cart snapshot, placed orders, migrations             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Size, Order and friends
//! - [`money`] - Integer money in pesewas
//! - [`pricing`] - Size-aware unit price resolution
//! - [`cart`] - The cart state machine and its persisted snapshot
//! - [`checkout`] - Shipping tiers, tax and order construction
//! - [`catalog`] - Seeded products, categories, shop filtering
//! - [`validation`] - Quantity and address rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use florals_core::{Cart, Size};
//! use florals_core::catalog::Catalog;
//!
//! let catalog = Catalog::seeded();
//! let tulips = catalog.require("get-well-tulips").unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(tulips, 2, Size::Medium).unwrap();
//! cart.add_item(tulips, 1, Size::Medium).unwrap();
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.item_count(), 3);
//! assert_eq!(cart.total().to_string(), "GH₵660.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Store display name.
pub const STORE_NAME: &str = "Rehoboth Florals";

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos like 1000 instead of 10 before they reach the payment page.
pub const MAX_ITEM_QUANTITY: i64 = 999;
