//! # Cart State
//!
//! The in-memory cart, its store repository and a watch channel carrying
//! the latest totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Command                 Cart Change              After Every Change    │
//! │  ───────                 ───────────              ──────────────────    │
//! │                                                                         │
//! │  cart add X1 2 ────────► Cart::add ─────┐                               │
//! │  cart update X1 5 ─────► Cart::update ──┼──► repo.save(cart)            │
//! │  cart remove X1 ───────► Cart::remove ──┤      (failure: warn!, keep)   │
//! │  cart clear ───────────► Cart::clear ───┘──► totals.send_replace(..)    │
//! │                                                                         │
//! │  New line without a known image:                                        │
//! │     tokio::spawn ──► find_primary ──► set_image ──► save + publish      │
//! │                                                                         │
//! │  NOTE: The cart Mutex is never held across an .await. Commits are       │
//! │        serialized by a separate async lock so the last save is always   │
//! │        the newest snapshot.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use partdeck_core::{AddOutcome, Cart, CartTotals, Language, Product};
use partdeck_media::ImageDiscovery;
use partdeck_store::CartRepository;

use crate::error::ApiError;

/// What a cart mutation did and whether it reached the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChange<T> {
    pub value: T,
    pub totals: CartTotals,
    pub persisted: bool,
    /// Store error when `persisted` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

#[derive(Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
    repo: CartRepository,
    totals: Arc<watch::Sender<CartTotals>>,
    /// Held from snapshot to publish.
    commits: Arc<AsyncMutex<()>>,
}

impl CartState {
    /// Restores the cart from the store.
    ///
    /// A corrupt ledger is reported by the repository as an empty cart.
    pub async fn load(repo: CartRepository) -> Result<Self, ApiError> {
        let cart = repo.load().await?;
        debug!(lines = cart.line_count(), "Cart restored");
        let (totals, _) = watch::channel(CartTotals::from(&cart));
        Ok(CartState {
            cart: Arc::new(Mutex::new(cart)),
            repo,
            totals: Arc::new(totals),
            commits: Arc::new(AsyncMutex::new(())),
        })
    }

    /// Receives the totals after every change.
    pub fn subscribe(&self) -> watch::Receiver<CartTotals> {
        self.totals.subscribe()
    }

    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of a product under a brand.
    ///
    /// A new line takes the cached primary image when one is known.
    /// Otherwise the image is looked up in the background; the returned
    /// handle resolves to whether the line was filled.
    pub async fn add(
        &self,
        product: &Product,
        quantity: i64,
        brand_key: &str,
        language: Language,
        discovery: &Arc<ImageDiscovery>,
    ) -> Result<(CartChange<AddOutcome>, Option<JoinHandle<bool>>), ApiError> {
        let code = product.display_code();
        let known_image = discovery.cached_primary(&code).flatten();

        let outcome = self.with_cart_mut(|cart| {
            cart.add(product, quantity, brand_key, language, known_image)
        })?;

        let fill = match &outcome {
            AddOutcome::Created {
                code,
                brand_key,
                needs_image: true,
            } => Some(self.spawn_image_fill(code.clone(), brand_key.clone(), discovery.clone())),
            _ => None,
        };

        Ok((self.commit(outcome).await, fill))
    }

    /// Sets the quantity of the first line with `code`. `quantity <= 0` removes it.
    pub async fn update(&self, code: &str, quantity: i64) -> Result<CartChange<()>, ApiError> {
        self.with_cart_mut(|cart| cart.update(code, quantity))?;
        Ok(self.commit(()).await)
    }

    /// Removes every line with `code` and reports how many went.
    pub async fn remove(&self, code: &str) -> CartChange<usize> {
        let removed = self.with_cart_mut(|cart| cart.remove(code));
        self.commit(removed).await
    }

    pub async fn clear(&self) -> CartChange<()> {
        self.with_cart_mut(Cart::clear);
        self.commit(()).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn spawn_image_fill(
        &self,
        code: String,
        brand_key: String,
        discovery: Arc<ImageDiscovery>,
    ) -> JoinHandle<bool> {
        let state = self.clone();
        tokio::spawn(async move {
            let Some(image) = discovery.find_primary(&code).await else {
                return false;
            };
            let filled = state.with_cart_mut(|cart| cart.set_image(&code, &brand_key, image));
            if filled {
                debug!(code, "Cart line image filled");
                state.commit(()).await;
            }
            filled
        })
    }

    async fn commit<T>(&self, value: T) -> CartChange<T> {
        let _commit = self.commits.lock().await;
        let snapshot = self.with_cart(Cart::clone);
        let totals = CartTotals::from(&snapshot);

        let persist_error = match self.repo.save(&snapshot).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Failed to persist cart, keeping in-memory changes");
                Some(e.to_string())
            }
        };

        self.totals.send_replace(totals);

        CartChange {
            value,
            totals,
            persisted: persist_error.is_none(),
            persist_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::media::testing::{media_state, write_primary};
    use partdeck_core::{CatalogIndex, Money};
    use partdeck_store::{Database, StoreConfig};

    fn index() -> CatalogIndex {
        CatalogIndex::from_json_str(
            r#"{ "Pumps": [
                { "CODE": "P-1", "MODEL": "Water pump", "PRICE": "2.50" },
                { "CODE": "P-2", "MODEL": "Oil pump", "PRICE": "1.00" }
            ] }"#,
        )
        .unwrap()
    }

    async fn cart_state() -> (Database, CartState) {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let state = CartState::load(db.cart()).await.unwrap();
        (db, state)
    }

    #[tokio::test]
    async fn test_add_persists_and_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_state(dir.path());
        let (db, cart) = cart_state().await;
        let mut totals = cart.subscribe();
        let index = index();
        let product = index.find_by_code("P-1").unwrap();

        let (change, _) = cart
            .add(product, 2, "no_brand", Language::EnUs, media.discovery())
            .await
            .unwrap();
        assert!(change.persisted);
        assert_eq!(change.totals.total_quantity, 2);
        assert_eq!(change.totals.total_price, Money::from_cents(500));

        assert!(totals.has_changed().unwrap());
        assert_eq!(totals.borrow_and_update().total_quantity, 2);

        let stored = db.cart().load().await.unwrap();
        assert_eq!(stored.quantity_of("P-1"), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_state(dir.path());
        let (_db, cart) = cart_state().await;
        let index = index();
        let product = index.find_by_code("P-1").unwrap();

        let err = cart
            .add(product, 0, "no_brand", Language::EnUs, media.discovery())
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert!(cart.with_cart(Cart::is_empty));
    }

    #[tokio::test]
    async fn test_background_image_fill() {
        let dir = tempfile::tempdir().unwrap();
        write_primary(dir.path(), "P-1");
        let media = media_state(dir.path());
        let (db, cart) = cart_state().await;
        let index = index();
        let product = index.find_by_code("P-1").unwrap();

        let (_, fill) = cart
            .add(product, 1, "kelon", Language::EnUs, media.discovery())
            .await
            .unwrap();
        assert!(fill.unwrap().await.unwrap());

        let image = cart.with_cart(|c| c.line("P-1", "kelon").unwrap().image.clone());
        assert_eq!(image.as_deref(), Some("images/P-1.png"));

        let stored = db.cart().load().await.unwrap();
        assert!(stored.line("P-1", "kelon").unwrap().image.is_some());
    }

    #[tokio::test]
    async fn test_cached_image_used_on_add() {
        let dir = tempfile::tempdir().unwrap();
        write_primary(dir.path(), "P-1");
        let media = media_state(dir.path());
        media.discovery().find_primary("P-1").await;
        let (_db, cart) = cart_state().await;
        let index = index();
        let product = index.find_by_code("P-1").unwrap();

        let (_, fill) = cart
            .add(product, 1, "no_brand", Language::EnUs, media.discovery())
            .await
            .unwrap();
        assert!(fill.is_none());
        assert!(cart.with_cart(|c| c.lines()[0].image.is_some()));
    }

    #[tokio::test]
    async fn test_update_remove_clear() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_state(dir.path());
        let (_db, cart) = cart_state().await;
        let index = index();
        for code in ["P-1", "P-2"] {
            let product = index.find_by_code(code).unwrap();
            cart.add(product, 1, "no_brand", Language::EnUs, media.discovery())
                .await
                .unwrap();
        }

        let change = cart.update("P-1", 4).await.unwrap();
        assert_eq!(change.totals.total_quantity, 5);

        assert!(cart.update("NOPE", 1).await.is_err());
        assert_eq!(cart.remove("NOPE").await.value, 0);

        let change = cart.remove("P-2").await;
        assert_eq!(change.value, 1);
        assert_eq!(change.totals.line_count, 1);

        let change = cart.clear().await;
        assert_eq!(change.totals, CartTotals::default());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_state(dir.path());
        let (db, cart) = cart_state().await;
        let index = index();
        let product = index.find_by_code("P-1").unwrap();

        db.close().await;
        let (change, _) = cart
            .add(product, 3, "no_brand", Language::EnUs, media.discovery())
            .await
            .unwrap();

        assert!(!change.persisted);
        assert!(change.persist_error.is_some());
        assert_eq!(change.totals.total_quantity, 3);
        assert_eq!(cart.with_cart(|c| c.quantity_of("P-1")), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commits_store_latest_cart() {
        let dir = tempfile::tempdir().unwrap();
        let media = media_state(dir.path());
        let db = Database::new(StoreConfig::new(dir.path().join("cart.db")))
            .await
            .unwrap();
        let cart = CartState::load(db.cart()).await.unwrap();
        let product = index().find_by_code("P-1").unwrap().clone();

        let tasks: Vec<_> = (0..24)
            .map(|i| {
                let cart = cart.clone();
                let product = product.clone();
                let discovery = media.discovery().clone();
                tokio::spawn(async move {
                    let brand = format!("brand-{i}");
                    let (_, fill) = cart
                        .add(&product, 1, &brand, Language::EnUs, &discovery)
                        .await
                        .unwrap();
                    if let Some(fill) = fill {
                        fill.await.unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored = db.cart().load().await.unwrap();
        assert_eq!(stored.line_count(), 24);
        assert_eq!(stored, cart.with_cart(Cart::clone));
    }
}
