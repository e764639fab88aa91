//! # Order Repository
//!
//! Placed orders, one JSON document per order under `order-{id}`.
//!
//! ## Placing an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place(order)                                                           │
//! │    BEGIN                                                                │
//! │      upsert order-{id}      ← the order document                        │
//! │      upsert cart-storage    ← empty cart snapshot                       │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  Both writes land or neither does.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::storage::{upsert, StorageRepository};
use florals_core::cart::{Cart, CART_STORAGE_KEY};
use florals_core::checkout::{order_storage_key, ORDER_KEY_PREFIX};
use florals_core::Order;

/// Repository for placed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    fn storage(&self) -> StorageRepository {
        StorageRepository::new(self.pool.clone())
    }

    /// Stores the order and empties the persisted cart in one transaction.
    pub async fn place(&self, order: &Order) -> DbResult<()> {
        let order_json = serde_json::to_string(order)?;
        let empty_cart = Cart::new().to_snapshot_json()?;

        let mut tx = self.pool.begin().await?;
        upsert(&mut *tx, &order_storage_key(&order.id), &order_json).await?;
        upsert(&mut *tx, CART_STORAGE_KEY, &empty_cart).await?;
        tx.commit().await?;

        info!(
            id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );
        Ok(())
    }

    /// Order by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        self.storage().get_json(&order_storage_key(id)).await
    }

    /// Order by id, `NotFound` when missing.
    pub async fn require(&self, id: &str) -> DbResult<Order> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// All orders, newest first.
    ///
    /// Documents that no longer decode are logged and skipped.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let entries = self.storage().entries_with_prefix(ORDER_KEY_PREFIX).await?;

        let mut orders: Vec<Order> = entries
            .iter()
            .filter_map(|(key, raw)| match serde_json::from_str::<Order>(raw) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping unreadable order");
                    None
                }
            })
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Order by its customer-facing number (case-insensitive).
    pub async fn find_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let wanted = order_number.trim();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|o| o.order_number.eq_ignore_ascii_case(wanted)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbError};
    use chrono::{Duration, Utc};
    use florals_core::checkout::{build_order, CheckoutRules, CheckoutSummary, PaymentConfirmation};
    use florals_core::catalog::Catalog;
    use florals_core::{Cart, Order, ShippingAddress, Size};

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Efua".to_string(),
            last_name: "Asante".to_string(),
            email: "efua@example.com".to_string(),
            phone: "0201112223".to_string(),
            address: "7 Oxford Street".to_string(),
            city: "Accra".to_string(),
            state: None,
            zip_code: "GA-100".to_string(),
            country: "Ghana".to_string(),
        }
    }

    fn order_at(cart: &Cart, minutes_ago: i64) -> Order {
        let rules = CheckoutRules::default();
        let total = CheckoutSummary::for_cart(cart, &rules).total;
        build_order(
            cart,
            &address(),
            &PaymentConfirmation::new("PSK-1", total),
            &rules,
            Utc::now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    fn cart() -> Cart {
        let catalog = Catalog::seeded();
        let mut cart = Cart::new();
        cart.add_item(catalog.require("red-rose-bouquet").unwrap(), 1, Size::Medium)
            .unwrap();
        cart
    }

    #[tokio::test]
    async fn test_place_get_require() {
        let db = Database::in_memory().await.unwrap();
        let order = order_at(&cart(), 0);

        db.orders().place(&order).await.unwrap();
        assert_eq!(db.orders().get(&order.id).await.unwrap(), Some(order.clone()));
        assert_eq!(db.orders().require(&order.id).await.unwrap(), order);
        assert!(matches!(
            db.orders().require("nope").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_place_clears_cart() {
        let db = Database::in_memory().await.unwrap();
        let cart = cart();
        db.carts().save(&cart).await.unwrap();

        let order = order_at(&cart, 0);
        db.orders().place(&order).await.unwrap();

        assert!(db.orders().get(&order.id).await.unwrap().is_some());
        assert!(db.carts().load().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_find_by_number() {
        let db = Database::in_memory().await.unwrap();
        let older = order_at(&cart(), 30);
        let newer = order_at(&cart(), 5);
        db.orders().place(&older).await.unwrap();
        db.orders().place(&newer).await.unwrap();
        db.carts().save(&cart()).await.unwrap();

        let listed = db.orders().list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);

        let found = db
            .orders()
            .find_by_number(&older.order_number.to_lowercase())
            .await
            .unwrap();
        assert_eq!(found.map(|o| o.id), Some(older.id));
    }

    #[tokio::test]
    async fn test_unreadable_order_is_skipped() {
        let db = Database::in_memory().await.unwrap();
        let order = order_at(&cart(), 0);
        db.orders().place(&order).await.unwrap();
        db.storage().set("order-garbled", "{\"id\":").await.unwrap();

        let listed = db.orders().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, order.id);

        let found = db.orders().find_by_number(&order.order_number).await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(order.id));
        assert!(matches!(
            db.orders().require("garbled").await,
            Err(DbError::Serialization(_))
        ));
    }
}
