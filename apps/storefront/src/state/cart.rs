//! # Cart Store
//!
//! The storefront's single cart: pure transitions from `florals_core::Cart`,
//! persisted after every mutation and observable through a watch channel.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Mutation                                  │
//! │                                                                         │
//! │  add_item / update_* / remove_* / clear                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock (tokio Mutex) ──► clone ──► apply to clone                        │
//! │                                       │                                 │
//! │                          rule error? ─┼──► return, memory unchanged     │
//! │                                       ▼                                 │
//! │                              save snapshot (cart-storage)               │
//! │                                       │                                 │
//! │                       storage error? ─┼──► return, memory unchanged     │
//! │                                       ▼                                 │
//! │              changed? commit clone ──► publish CartTotals               │
//! │                                                                         │
//! │  NOTE: The lock is held across the save; mutations never interleave.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use florals_core::{Cart, CartLineItem, CartTotals, CoreError, CoreResult, Money, Order, Product, Size};
use florals_db::{CartRepository, DbError, OrderRepository};

/// Why a cart operation failed.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// A cart rule rejected the change.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// The change was valid but could not be persisted.
    #[error(transparent)]
    Storage(#[from] DbError),
}

pub type CartStoreResult<T> = Result<T, CartStoreError>;

/// Persisted, observable cart.
#[derive(Debug)]
pub struct CartStore {
    cart: Mutex<Cart>,
    repo: CartRepository,
    totals: watch::Sender<CartTotals>,
}

impl CartStore {
    /// Re-hydrates from storage.
    ///
    /// A missing snapshot starts an empty cart. So does an unreadable one;
    /// it is logged and overwritten by the next mutation, even one that
    /// changes nothing.
    pub async fn load(repo: CartRepository) -> CartStoreResult<Self> {
        let cart = match repo.load().await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(DbError::Serialization(e)) => {
                warn!(error = %e, "Discarding unreadable cart snapshot");
                Cart::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            lines = cart.line_count(),
            items = cart.item_count(),
            "Cart store loaded"
        );

        let (totals, _) = watch::channel(CartTotals::from(&cart));
        Ok(CartStore {
            cart: Mutex::new(cart),
            repo,
            totals,
        })
    }

    /// Latest totals, updated after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartTotals> {
        self.totals.subscribe()
    }

    /// Copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn totals(&self) -> CartTotals {
        CartTotals::from(&*self.cart.lock().await)
    }

    /// Σ unit price × quantity.
    pub async fn total(&self) -> Money {
        self.cart.lock().await.total()
    }

    /// Σ quantity.
    pub async fn item_count(&self) -> i64 {
        self.cart.lock().await.item_count()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of `product` at `size`, merging into an existing line.
    pub async fn add_item(
        &self,
        product: &Product,
        quantity: i64,
        size: Size,
    ) -> CartStoreResult<CartLineItem> {
        debug!(product_id = %product.id, quantity, size = %size, "Adding to cart");
        self.mutate(|cart| cart.add_item(product, quantity, size).cloned())
            .await
    }

    /// Removes every line of `product_id`.
    pub async fn remove_item(&self, product_id: &str) -> CartStoreResult<usize> {
        debug!(product_id = %product_id, "Removing product from cart");
        self.mutate(|cart| Ok(cart.remove_item(product_id))).await
    }

    /// Removes the (`product_id`, `size`) line only.
    pub async fn remove_variant(&self, product_id: &str, size: Size) -> CartStoreResult<usize> {
        debug!(product_id = %product_id, size = %size, "Removing variant from cart");
        self.mutate(|cart| Ok(cart.remove_variant(product_id, size)))
            .await
    }

    /// Sets the quantity of every line of `product_id`; `<= 0` removes them.
    pub async fn update_quantity(&self, product_id: &str, quantity: i64) -> CartStoreResult<usize> {
        debug!(product_id = %product_id, quantity, "Updating cart quantity");
        self.mutate(|cart| cart.update_quantity(product_id, quantity))
            .await
    }

    /// Sets the quantity of the (`product_id`, `size`) line; `<= 0` removes it.
    pub async fn update_variant_quantity(
        &self,
        product_id: &str,
        size: Size,
        quantity: i64,
    ) -> CartStoreResult<usize> {
        debug!(product_id = %product_id, size = %size, quantity, "Updating variant quantity");
        self.mutate(|cart| cart.update_variant_quantity(product_id, size, quantity))
            .await
    }

    /// Empties the cart.
    pub async fn clear(&self) -> CartStoreResult<()> {
        debug!("Clearing cart");
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    /// Builds an order from the current cart and stores it, clearing the
    /// cart in the same storage transaction.
    ///
    /// The cart stays locked from build to commit.
    pub async fn place_order<F>(&self, orders: &OrderRepository, build: F) -> CartStoreResult<Order>
    where
        F: FnOnce(&Cart) -> CoreResult<Order>,
    {
        let mut guard = self.cart.lock().await;

        let order = build(&*guard)?;
        orders.place(&order).await?;

        guard.clear();
        self.publish(&guard);
        Ok(order)
    }

    async fn mutate<R, F>(&self, apply: F) -> CartStoreResult<R>
    where
        F: FnOnce(&mut Cart) -> CoreResult<R>,
    {
        let mut guard = self.cart.lock().await;

        let mut next = guard.clone();
        let out = apply(&mut next)?;

        self.repo.save(&next).await?;

        if next != *guard {
            *guard = next;
            self.publish(&guard);
        }
        Ok(out)
    }

    fn publish(&self, cart: &Cart) {
        self.totals.send_replace(CartTotals::from(cart));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use florals_core::catalog::Catalog;
    use florals_db::Database;

    async fn store() -> (Database, CartStore) {
        let db = Database::in_memory().await.unwrap();
        let store = CartStore::load(db.carts()).await.unwrap();
        (db, store)
    }

    #[tokio::test]
    async fn test_empty_on_first_start() {
        let (_db, store) = store().await;
        assert!(store.snapshot().await.is_empty());
        assert_eq!(store.total().await, Money::zero());
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let (db, store) = store().await;
        let catalog = Catalog::seeded();
        let peony = catalog.require("pink-peony-bouquet").unwrap();

        store.add_item(peony, 2, Size::Large).await.unwrap();
        assert_eq!(db.carts().load().await.unwrap().unwrap().item_count(), 2);

        store.update_quantity(&peony.id, 5).await.unwrap();
        assert_eq!(db.carts().load().await.unwrap().unwrap().item_count(), 5);

        store.remove_item(&peony.id).await.unwrap();
        assert!(db.carts().load().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_restores_cart() {
        let (db, store) = store().await;
        let catalog = Catalog::seeded();

        store
            .add_item(catalog.require("red-rose-bouquet").unwrap(), 1, Size::Small)
            .await
            .unwrap();
        store
            .add_item(catalog.require("bridesmaid-posy").unwrap(), 3, Size::Medium)
            .await
            .unwrap();
        let before = store.snapshot().await;

        let reloaded = CartStore::load(db.carts()).await.unwrap();
        let after = reloaded.snapshot().await;
        assert_eq!(after, before);
        assert_eq!(reloaded.item_count().await, 4);
        assert_eq!(reloaded.total().await, before.total());
    }

    #[tokio::test]
    async fn test_persist_failure_leaves_memory_unchanged() {
        let (db, store) = store().await;
        let catalog = Catalog::seeded();
        let tulips = catalog.require("get-well-tulips").unwrap();

        store.add_item(tulips, 1, Size::Medium).await.unwrap();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        db.close().await;

        let err = store.add_item(tulips, 4, Size::Medium).await.unwrap_err();
        assert!(matches!(err, CartStoreError::Storage(_)));
        assert_eq!(store.item_count().await, 1);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_rule_error_leaves_memory_unchanged() {
        let (_db, store) = store().await;
        let catalog = Catalog::seeded();
        let posy = catalog.require("everyday-mixed-posy").unwrap();

        store.add_item(posy, 998, Size::Medium).await.unwrap();
        let err = store.add_item(posy, 2, Size::Medium).await.unwrap_err();
        assert!(matches!(
            err,
            CartStoreError::Rule(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(store.item_count().await, 998);

        let err = store.add_item(posy, 0, Size::Medium).await.unwrap_err();
        assert!(matches!(err, CartStoreError::Rule(CoreError::InvalidQuantity(0))));
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_totals() {
        let (_db, store) = store().await;
        let catalog = Catalog::seeded();
        let rose = catalog.require("red-rose-bouquet").unwrap();
        let mut rx = store.subscribe();

        store.add_item(rose, 1, Size::Medium).await.unwrap();
        store.add_item(rose, 1, Size::Large).await.unwrap();

        assert!(rx.has_changed().unwrap());
        let totals = *rx.borrow_and_update();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal, Money::from_minor(65000 + 90000));
    }

    #[tokio::test]
    async fn test_variant_operations() {
        let (_db, store) = store().await;
        let catalog = Catalog::seeded();
        let rose = catalog.require("red-rose-bouquet").unwrap();

        store.add_item(rose, 1, Size::Small).await.unwrap();
        store.add_item(rose, 1, Size::Large).await.unwrap();

        assert_eq!(store.update_variant_quantity(&rose.id, Size::Large, 4).await.unwrap(), 1);
        assert_eq!(store.item_count().await, 5);

        assert_eq!(store.remove_variant(&rose.id, Size::Small).await.unwrap(), 1);
        let cart = store.snapshot().await;
        assert_eq!(cart.line_count(), 1);
        assert!(cart.find(&rose.id, Size::Large).is_some());
    }

    #[tokio::test]
    async fn test_noop_does_not_notify() {
        let (_db, store) = store().await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        assert_eq!(store.remove_item("nothing-here").await.unwrap(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_starts_empty() {
        let db = Database::in_memory().await.unwrap();
        db.storage()
            .set(florals_core::cart::CART_STORAGE_KEY, "{\"state\":42}")
            .await
            .unwrap();

        let store = CartStore::load(db.carts()).await.unwrap();
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_overwrites_unreadable_snapshot() {
        let db = Database::in_memory().await.unwrap();
        db.storage()
            .set(florals_core::cart::CART_STORAGE_KEY, "{\"state\":42}")
            .await
            .unwrap();

        let store = CartStore::load(db.carts()).await.unwrap();
        store.clear().await.unwrap();

        let raw = db
            .storage()
            .get(florals_core::cart::CART_STORAGE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, Cart::new().to_snapshot_json().unwrap());
        assert!(db.carts().load().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_noop_still_persists() {
        let (db, store) = store().await;
        assert_eq!(db.carts().load().await.unwrap(), None);

        assert_eq!(store.remove_item("nothing-here").await.unwrap(), 0);
        assert_eq!(db.carts().load().await.unwrap(), Some(Cart::new()));
    }
}
