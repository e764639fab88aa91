//! # Cart Repository
//!
//! The cart snapshot document under `cart-storage`.
//!
//! ## Document Shape
//! ```text
//! {"state":{"items":[{ "id": "...", "product": {...}, "selectedSize": "large",
//!                      "selectedPrice": 7200, "quantity": 2, "addedAt": "..." }]},
//!  "version":0}
//! ```

use tracing::debug;

use crate::error::DbResult;
use crate::repository::storage::StorageRepository;
use florals_core::cart::{Cart, CART_STORAGE_KEY};

/// Repository for the single persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository {
    storage: StorageRepository,
}

impl CartRepository {
    pub fn new(storage: StorageRepository) -> Self {
        CartRepository { storage }
    }

    /// Reads the snapshot. `Ok(None)` when no cart was ever saved.
    ///
    /// ## Errors
    /// `DbError::Serialization` when the stored document does not decode.
    pub async fn load(&self) -> DbResult<Option<Cart>> {
        let Some(raw) = self.storage.get(CART_STORAGE_KEY).await? else {
            return Ok(None);
        };

        let cart = Cart::from_snapshot_json(&raw)?;
        debug!(lines = cart.line_count(), "Loaded cart snapshot");
        Ok(Some(cart))
    }

    /// Writes the whole cart, replacing the previous snapshot.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        let raw = cart.to_snapshot_json()?;
        self.storage.set(CART_STORAGE_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbError};
    use florals_core::catalog::Catalog;
    use florals_core::cart::CART_STORAGE_KEY;
    use florals_core::{Cart, Size};

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.carts().load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = Database::in_memory().await.unwrap();
        let catalog = Catalog::seeded();

        let mut cart = Cart::new();
        cart.add_item(catalog.require("pink-peony-bouquet").unwrap(), 2, Size::Large)
            .unwrap();
        cart.add_item(catalog.require("everyday-mixed-posy").unwrap(), 1, Size::Small)
            .unwrap();

        db.carts().save(&cart).await.unwrap();
        let loaded = db.carts().load().await.unwrap().unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.total(), cart.total());

        let raw = db.storage().get(CART_STORAGE_KEY).await.unwrap().unwrap();
        assert!(raw.contains(r#""version":0"#));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        db.storage().set(CART_STORAGE_KEY, "[]").await.unwrap();
        assert!(matches!(db.carts().load().await, Err(DbError::Serialization(_))));
    }
}
