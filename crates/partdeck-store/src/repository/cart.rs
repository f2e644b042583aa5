//! # Cart Repository
//!
//! The whole cart ledger is one JSON array under a single key. Every
//! mutation rewrites it; an empty cart removes the key.

use tracing::{debug, warn};

use partdeck_core::{Cart, CartItem};

use crate::error::{StoreError, StoreResult};
use crate::repository::kv::KvRepository;

/// Storage key of the cart ledger.
pub const CART_KEY: &str = "partdeck.cart";

#[derive(Debug, Clone)]
pub struct CartRepository {
    kv: KvRepository,
}

impl CartRepository {
    pub fn new(kv: KvRepository) -> Self {
        CartRepository { kv }
    }

    /// Loads the stored cart.
    ///
    /// A missing or unreadable ledger yields an empty cart; unreadable data
    /// is logged and left in place until the next save overwrites it.
    pub async fn load(&self) -> StoreResult<Cart> {
        match self.kv.get_json::<Vec<CartItem>>(CART_KEY).await {
            Ok(Some(items)) => {
                debug!(lines = items.len(), "Cart loaded");
                Ok(Cart::from_items(items))
            }
            Ok(None) => Ok(Cart::new()),
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(error = %reason, "Stored cart is unreadable, starting empty");
                Ok(Cart::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, cart: &Cart) -> StoreResult<()> {
        if cart.is_empty() {
            self.kv.delete(CART_KEY).await?;
            return Ok(());
        }
        self.kv.set_json(CART_KEY, cart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, StoreConfig};
    use partdeck_core::record::ProductRecord;
    use partdeck_core::{Language, Product};
    use serde_json::json;

    fn widget() -> Product {
        let serde_json::Value::Object(map) = json!({ "CODE": "X1", "MODEL": "Widget", "PRICE": 4 })
        else {
            unreachable!()
        };
        Product::new("Pumps", 0, ProductRecord::new(map))
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let repo = db.cart();

        assert!(repo.load().await.unwrap().is_empty());

        let mut cart = Cart::new();
        cart.add(&widget(), 3, "kelon", Language::EnUs, None).unwrap();
        repo.save(&cart).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.total_items(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_ledger_loads_empty() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        db.kv().set(CART_KEY, "[{\"code\":").await.unwrap();

        assert!(db.cart().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saving_empty_cart_removes_ledger() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let mut cart = Cart::new();
        cart.add(&widget(), 1, "no_brand", Language::EnUs, None).unwrap();
        db.cart().save(&cart).await.unwrap();

        cart.clear();
        db.cart().save(&cart).await.unwrap();
        assert_eq!(db.kv().get(CART_KEY).await.unwrap(), None);
        assert!(db.cart().load().await.unwrap().is_empty());
    }
}
