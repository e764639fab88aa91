//! # Cart
//!
//! Pure cart state transitions. Persistence and change notification are
//! layered on top by the storefront's `CartStore`.
//!
//! ## Line Item Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A line is keyed by (product id, size):                                 │
//! │                                                                         │
//! │  add(roses, 1, medium) ──► [roses/medium ×1]                            │
//! │  add(roses, 2, medium) ──► [roses/medium ×3]              (merged)      │
//! │  add(roses, 1, large)  ──► [roses/medium ×3, roses/large ×1]            │
//! │                                                                         │
//! │  remove_item(roses)            removes BOTH lines                       │
//! │  remove_variant(roses, large)  removes only roses/large                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per (product id, size)
//! - Every line has quantity >= 1; driving it to 0 removes the line
//! - A line's `selected_price` is frozen when the line is created

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{base_price, resolve_price};
use crate::types::{Product, Size};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Version written into the persisted envelope.
pub const CART_SNAPSHOT_VERSION: u32 = 0;

// =============================================================================
// Line Item
// =============================================================================

/// One product at one size, with a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// `{product_id}-{size}-{unix_millis}`.
    pub id: String,

    /// Product as it was when the line was created.
    pub product: Product,

    pub selected_size: Size,

    /// Unit price frozen at add-time. Older snapshots may lack it.
    #[serde(default)]
    pub selected_price: Option<Money>,

    pub quantity: i64,

    #[serde(default = "Utc::now")]
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    fn new(product: &Product, size: Size, price: Money, quantity: i64, now: DateTime<Utc>) -> Self {
        CartLineItem {
            id: line_item_id(&product.id, size, now),
            product: product.clone(),
            selected_size: size,
            selected_price: Some(price),
            quantity,
            added_at: now,
        }
    }

    /// The frozen unit price, or the product's base price when absent.
    pub fn unit_price(&self) -> Money {
        self.selected_price
            .or_else(|| base_price(&self.product))
            .unwrap_or_default()
    }

    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    fn is_variant(&self, product_id: &str, size: Size) -> bool {
        self.product.id == product_id && self.selected_size == size
    }
}

/// Builds a line item id from its identity and creation instant.
pub fn line_item_id(product_id: &str, size: Size, at: DateTime<Utc>) -> String {
    format!("{}-{}-{}", product_id, size, at.timestamp_millis())
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart. Serializes as `{"items": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Lines in insertion (display) order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Adds `quantity` units of `product` at `size`.
    ///
    /// ## Behavior
    /// - Line for (product, size) exists: quantity increases, price is kept
    /// - Otherwise: new line with the price resolved now
    ///
    /// ## Errors
    /// - `InvalidQuantity` when `quantity <= 0`
    /// - `PriceUnavailable` when the product has no price at all
    /// - `QuantityTooLarge` when the line would exceed 999 units
    /// - `CartTooLarge` when a new line would exceed 100 lines
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        size: Size,
    ) -> CoreResult<&CartLineItem> {
        self.add_item_at(product, quantity, size, Utc::now())
    }

    /// [`Cart::add_item`] with an explicit creation instant.
    pub fn add_item_at(
        &mut self,
        product: &Product,
        quantity: i64,
        size: Size,
        now: DateTime<Utc>,
    ) -> CoreResult<&CartLineItem> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity(quantity));
        }

        let price = resolve_price(product, size)?;

        if let Some(pos) = self.position(&product.id, size) {
            let existing = self.items[pos].quantity;
            let new_qty = existing
                .checked_add(quantity)
                .filter(|q| *q <= MAX_ITEM_QUANTITY)
                .ok_or(CoreError::QuantityTooLarge {
                    requested: existing.saturating_add(quantity),
                    max: MAX_ITEM_QUANTITY,
                })?;
            self.items[pos].quantity = new_qty;
            return Ok(&self.items[pos]);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.items
            .push(CartLineItem::new(product, size, price, quantity, now));
        Ok(&self.items[self.items.len() - 1])
    }

    /// Removes every line of `product_id`, whatever the size.
    ///
    /// Returns the number of lines removed; 0 is not an error.
    pub fn remove_item(&mut self, product_id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        before - self.items.len()
    }

    /// Removes the single line for (`product_id`, `size`).
    pub fn remove_variant(&mut self, product_id: &str, size: Size) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.is_variant(product_id, size));
        before - self.items.len()
    }

    /// Sets the quantity of every line of `product_id`.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - No matching line: no-op
    ///
    /// Returns the number of lines touched.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<usize> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }
        check_line_quantity(quantity)?;

        let mut touched = 0;
        for item in self.items.iter_mut().filter(|i| i.product.id == product_id) {
            item.quantity = quantity;
            touched += 1;
        }
        Ok(touched)
    }

    /// Sets the quantity of the (`product_id`, `size`) line only.
    pub fn update_variant_quantity(
        &mut self,
        product_id: &str,
        size: Size,
        quantity: i64,
    ) -> CoreResult<usize> {
        if quantity <= 0 {
            return Ok(self.remove_variant(product_id, size));
        }
        check_line_quantity(quantity)?;

        match self.position(product_id, size) {
            Some(pos) => {
                self.items[pos].quantity = quantity;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ unit price × quantity.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Σ quantity (units, not lines).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for (`product_id`, `size`), if any.
    pub fn find(&self, product_id: &str, size: Size) -> Option<&CartLineItem> {
        self.position(product_id, size).map(|pos| &self.items[pos])
    }

    fn position(&self, product_id: &str, size: Size) -> Option<usize> {
        self.items.iter().position(|i| i.is_variant(product_id, size))
    }

    // -------------------------------------------------------------------------
    // Snapshot envelope
    // -------------------------------------------------------------------------

    /// Serializes as `{"state":{"items":[...]},"version":0}`.
    pub fn to_snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&PersistedCart {
            state: self.clone(),
            version: CART_SNAPSHOT_VERSION,
        })
    }

    /// Restores a cart from [`Cart::to_snapshot_json`] output, verbatim.
    pub fn from_snapshot_json(json: &str) -> serde_json::Result<Self> {
        let persisted: PersistedCart = serde_json::from_str(json)?;
        Ok(persisted.state)
    }
}

fn check_line_quantity(quantity: i64) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Storage envelope around the cart state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedCart {
    state: Cart,
    #[serde(default)]
    version: u32,
}

// =============================================================================
// Totals
// =============================================================================

/// Cart summary pushed to subscribers and returned to the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub subtotal: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            subtotal: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn flat_product(id: &str, price_minor: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Bouquet {}", id),
            description: String::new(),
            price: Some(Money::from_minor(price_minor)),
            prices: BTreeMap::new(),
            original_price: None,
            image: String::new(),
            category: "everyday".to_string(),
            in_stock: true,
            stock: 50,
            rating: 4.0,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sized_product(id: &str) -> Product {
        let mut p = flat_product(id, 0);
        p.price = None;
        p.prices = BTreeMap::from([
            (Size::Small, Money::from_minor(1000)),
            (Size::Medium, Money::from_minor(1500)),
            (Size::Large, Money::from_minor(2500)),
        ]);
        p
    }

    #[test]
    fn test_add_same_variant_twice_merges() {
        let mut cart = Cart::new();
        let p = sized_product("roses");

        cart.add_item(&p, 1, Size::Medium).unwrap();
        cart.add_item(&p, 1, Size::Medium).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_distinct_sizes_make_distinct_lines() {
        let mut cart = Cart::new();
        let p = sized_product("roses");

        cart.add_item(&p, 1, Size::Small).unwrap();
        cart.add_item(&p, 1, Size::Large).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.find("roses", Size::Small).unwrap().unit_price().minor_units(), 1000);
        assert_eq!(cart.find("roses", Size::Large).unwrap().unit_price().minor_units(), 2500);
    }

    #[test]
    fn test_item_count_sums_units() {
        let mut cart = Cart::new();
        let p = flat_product("lilies", 999);

        cart.add_item(&p, 3, Size::Medium).unwrap();
        cart.add_item(&p, 2, Size::Medium).unwrap();

        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_merge_keeps_original_price() {
        let mut cart = Cart::new();
        let mut p = flat_product("tulips", 1200);
        cart.add_item(&p, 1, Size::Medium).unwrap();

        p.price = Some(Money::from_minor(9999));
        cart.add_item(&p, 1, Size::Medium).unwrap();

        let line = cart.find("tulips", Size::Medium).unwrap();
        assert_eq!(line.selected_price, Some(Money::from_minor(1200)));
        assert_eq!(cart.total().minor_units(), 2400);
    }

    #[test]
    fn test_non_positive_add_rejected() {
        let mut cart = Cart::new();
        let p = flat_product("orchid", 5000);

        assert!(matches!(
            cart.add_item(&p, 0, Size::Medium),
            Err(CoreError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add_item(&p, -3, Size::Medium),
            Err(CoreError::InvalidQuantity(-3))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unpriced_product_rejected() {
        let mut cart = Cart::new();
        let mut p = flat_product("mystery", 0);
        p.price = None;

        assert!(matches!(
            cart.add_item(&p, 1, Size::Medium),
            Err(CoreError::PriceUnavailable { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_ceiling() {
        let mut cart = Cart::new();
        let p = flat_product("daisies", 100);

        cart.add_item(&p, 998, Size::Medium).unwrap();
        let err = cart.add_item(&p, 2, Size::Medium).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, max: 999 }));
        assert_eq!(cart.item_count(), 998);
    }

    #[test]
    fn test_merge_huge_quantity_is_rejected() {
        let mut cart = Cart::new();
        let p = flat_product("daisies", 100);

        cart.add_item(&p, 1, Size::Medium).unwrap();
        let before = cart.clone();

        let err = cart.add_item(&p, i64::MAX, Size::Medium).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: i64::MAX, max: 999 }));
        assert_eq!(cart, before);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_line_ceiling() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&flat_product(&format!("p{}", i), 100), 1, Size::Medium)
                .unwrap();
        }
        let err = cart
            .add_item(&flat_product("one-too-many", 100), 1, Size::Medium)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: 100 }));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let p = flat_product("lilies", 999);
        let other = flat_product("roses", 500);

        cart.add_item(&p, 2, Size::Medium).unwrap();
        cart.add_item(&other, 1, Size::Medium).unwrap();

        assert_eq!(cart.update_quantity("lilies", 0).unwrap(), 1);
        assert_eq!(cart.item_count(), 1);
        assert!(cart.find("lilies", Size::Medium).is_none());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = Cart::new();
        let p = flat_product("lilies", 999);

        cart.add_item(&p, 2, Size::Medium).unwrap();
        cart.update_quantity("lilies", 7).unwrap();
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.update_quantity("ghost", 3).unwrap(), 0);
        assert_eq!(cart.remove_item("ghost"), 0);
        assert!(cart.is_empty());
    }

    /// Product-scoped operations act on every size of the product.
    #[test]
    fn test_product_scoped_ops_hit_all_sizes() {
        let mut cart = Cart::new();
        let p = sized_product("roses");
        cart.add_item(&p, 1, Size::Small).unwrap();
        cart.add_item(&p, 4, Size::Large).unwrap();

        assert_eq!(cart.update_quantity("roses", 2).unwrap(), 2);
        assert!(cart.items().iter().all(|i| i.quantity == 2));

        assert_eq!(cart.remove_item("roses"), 2);
        assert!(cart.is_empty());
    }

    /// Size-scoped operations leave sibling sizes alone.
    #[test]
    fn test_variant_scoped_ops_hit_one_size() {
        let mut cart = Cart::new();
        let p = sized_product("roses");
        cart.add_item(&p, 1, Size::Small).unwrap();
        cart.add_item(&p, 4, Size::Large).unwrap();

        assert_eq!(cart.update_variant_quantity("roses", Size::Large, 6).unwrap(), 1);
        assert_eq!(cart.find("roses", Size::Small).unwrap().quantity, 1);
        assert_eq!(cart.find("roses", Size::Large).unwrap().quantity, 6);

        assert_eq!(cart.update_variant_quantity("roses", Size::Large, 0).unwrap(), 1);
        assert_eq!(cart.line_count(), 1);

        assert_eq!(cart.remove_variant("roses", Size::Small), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total() {
        let mut cart = Cart::new();
        cart.add_item(&flat_product("a", 1500), 2, Size::Medium).unwrap();
        cart.add_item(&flat_product("b", 3000), 1, Size::Medium).unwrap();

        assert_eq!(cart.total().minor_units(), 6000);
    }

    #[test]
    fn test_total_falls_back_to_base_price() {
        let mut cart = Cart::new();
        cart.add_item(&sized_product("roses"), 2, Size::Large).unwrap();
        cart.items[0].selected_price = None;

        // cheapest size is 1000
        assert_eq!(cart.total().minor_units(), 2000);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&flat_product("a", 1500), 2, Size::Medium).unwrap();
        cart.clear();

        assert!(cart.total().is_zero());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_line_item_id_format() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let mut cart = Cart::new();
        let line = cart
            .add_item_at(&sized_product("roses"), 1, Size::Large, at)
            .unwrap();
        assert_eq!(line.id, "roses-large-1700000000123");
    }

    #[test]
    fn test_snapshot_reload_preserves_totals() {
        let mut cart = Cart::new();
        cart.add_item(&sized_product("roses"), 2, Size::Large).unwrap();
        cart.add_item(&flat_product("lilies", 999), 3, Size::Medium).unwrap();

        let json = cart.to_snapshot_json().unwrap();
        assert!(json.starts_with(r#"{"state":{"items":["#));

        let restored = Cart::from_snapshot_json(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.item_count(), 5);
        assert_eq!(restored.total(), cart.total());
    }

    #[test]
    fn test_snapshot_without_selected_price() {
        let json = r#"{"state":{"items":[{
            "id": "roses-medium-1",
            "product": {
                "id": "roses", "name": "Roses", "price": 800, "category": "everyday",
                "inStock": true,
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
            },
            "selectedSize": "medium",
            "quantity": 2
        }]},"version":0}"#;

        let cart = Cart::from_snapshot_json(json).unwrap();
        assert_eq!(cart.total().minor_units(), 1600);
    }

    #[test]
    fn test_totals_summary() {
        let mut cart = Cart::new();
        cart.add_item(&flat_product("a", 250), 4, Size::Medium).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.subtotal.minor_units(), 1000);
    }
}
