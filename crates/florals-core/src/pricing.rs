//! # Price Resolution
//!
//! Turns a product and a chosen size into a unit price.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_price(product, size)                                           │
//! │                                                                         │
//! │  1. prices[size] present?            → that price                       │
//! │  2. flat price present?              → flat price                       │
//! │  3. prices table non-empty?          → cheapest size (base price)       │
//! │  4. nothing                          → PriceUnavailable                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cheapest-size fallback in step 3 is the same base price the shop
//! grid displays ("from GH₵450.00").

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, Size};

/// Resolves the unit price of `product` at `size`.
///
/// ```rust
/// use florals_core::pricing::resolve_price;
/// # use florals_core::catalog::Catalog;
/// # use florals_core::Size;
/// let catalog = Catalog::seeded();
/// let product = catalog.get("pink-peony-bouquet").unwrap();
/// let large = resolve_price(product, Size::Large).unwrap();
/// assert!(large > resolve_price(product, Size::Small).unwrap());
/// ```
pub fn resolve_price(product: &Product, size: Size) -> CoreResult<Money> {
    if let Some(price) = product.prices.get(&size) {
        return Ok(*price);
    }

    if let Some(price) = product.price {
        return Ok(price);
    }

    min_size_price(product).ok_or_else(|| CoreError::PriceUnavailable {
        product_id: product.id.clone(),
        size,
    })
}

/// Base price used for listing, filtering and sorting: the flat price,
/// else the cheapest size price. `None` when the product has no price.
pub fn base_price(product: &Product) -> Option<Money> {
    product.price.or_else(|| min_size_price(product))
}

fn min_size_price(product: &Product) -> Option<Money> {
    product.prices.values().copied().min()
}

// =============================================================================
// Unit Tests
// =============================================================================
