//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  cart add X1 2 --brand kelon                                            │
//! │       │                                                                 │
//! │       ├── line (X1, kelon) exists? ──► quantity += 2                    │
//! │       └── otherwise ─────────────────► new line, image filled later     │
//! │                                                                         │
//! │  cart update X1 5 ──► first X1 line = 5      (0 or less removes X1)     │
//! │  cart remove X1 ────► every X1 line removed                             │
//! │  cart clear ────────► empty cart                                        │
//! │                                                                         │
//! │  Every change: saved to the store, totals published                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use partdeck_core::{AddOutcome, CartItem, CartTotals, Language, Money, DEFAULT_BRAND_KEY};

use crate::error::ApiError;
use crate::state::{CartChange, CartState, CatalogState, MediaState};

/// A cart line as shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Money,
    /// Displayable image location.
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub items: Vec<CartLineDto>,
    pub totals: CartTotals,
}

/// Result of any cart mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateDto {
    /// What happened, in a few words.
    pub summary: String,
    pub totals: CartTotals,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

impl CartUpdateDto {
    fn new<T>(summary: String, change: CartChange<T>) -> Self {
        CartUpdateDto {
            summary,
            totals: change.totals,
            persisted: change.persisted,
            persist_error: change.persist_error,
        }
    }
}

/// Current cart contents.
pub fn get_cart(cart: &CartState, media: &MediaState) -> CartDto {
    cart.with_cart(|c| CartDto {
        items: c
            .lines()
            .iter()
            .map(|item| CartLineDto {
                line_total: item.line_total(),
                image_path: item.image.as_deref().map(|p| media.discovery().locate(p)),
                item: item.clone(),
            })
            .collect(),
        totals: c.into(),
    })
}

/// Adds a product to the cart.
///
/// ## Returns
/// The update plus, for a new line without a known image, a handle to the
/// background image lookup.
///
/// ## Errors
/// - `NotFound` if no product has `code`
/// - `ValidationError` if `quantity < 1`
pub async fn add_to_cart(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
    code: &str,
    quantity: i64,
    brand_key: Option<&str>,
    language: Language,
) -> Result<(CartUpdateDto, Option<JoinHandle<bool>>), ApiError> {
    catalog.ensure_loaded().await?;
    let product = catalog
        .with_view(|view| view.index().and_then(|i| i.find_by_code(code)).cloned())
        .ok_or_else(|| ApiError::not_found("Product", code))?;

    let brand_key = brand_key.unwrap_or(DEFAULT_BRAND_KEY);
    let (change, fill) = cart
        .add(&product, quantity, brand_key, language, media.discovery())
        .await?;

    let summary = match &change.value {
        AddOutcome::Merged { code, brand_key } => {
            format!("Added {} more of {} ({})", quantity, code, language.brand_label(brand_key))
        }
        AddOutcome::Created { code, brand_key, .. } => {
            format!("Added {} x {} ({})", quantity, code, language.brand_label(brand_key))
        }
    };
    info!(code, quantity, brand_key, "Added to cart");
    Ok((CartUpdateDto::new(summary, change), fill))
}

/// Sets the quantity of the first line with `code`.
///
/// ## Errors
/// - `CartError` if the code is not in the cart
pub async fn update_cart_item(
    cart: &CartState,
    code: &str,
    quantity: i64,
) -> Result<CartUpdateDto, ApiError> {
    let change = cart.update(code, quantity).await?;
    let summary = if quantity <= 0 {
        format!("Removed {}", code)
    } else {
        format!("{} quantity set to {}", code, quantity)
    };
    Ok(CartUpdateDto::new(summary, change))
}

pub async fn remove_from_cart(cart: &CartState, code: &str) -> CartUpdateDto {
    let change = cart.remove(code).await;
    let summary = match change.value {
        0 => format!("{} was not in the cart", code),
        1 => format!("Removed {}", code),
        n => format!("Removed {} lines of {}", n, code),
    };
    CartUpdateDto::new(summary, change)
}

pub async fn clear_cart(cart: &CartState) -> CartUpdateDto {
    let change = cart.clear().await;
    info!("Cart cleared");
    CartUpdateDto::new("Cart cleared".to_string(), change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::testing::{write_catalog, CATALOG_JSON};
    use crate::state::media::testing::media_state;
    use partdeck_store::{Database, StoreConfig};

    #[tokio::test]
    async fn test_add_update_remove() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let catalog = CatalogState::new(write_catalog(dir.path(), CATALOG_JSON), 12);
        let cart = CartState::load(db.cart()).await.unwrap();
        let media = media_state(dir.path());

        let (update, _) = add_to_cart(&catalog, &cart, &media, "P-1", 2, None, Language::EnUs)
            .await
            .unwrap();
        assert_eq!(update.summary, "Added 2 x P-1 (No Brand)");
        assert_eq!(update.totals.total_price, Money::from_cents(3980));

        let (update, _) =
            add_to_cart(&catalog, &cart, &media, "P-1", 1, Some("kelon"), Language::EnUs)
                .await
                .unwrap();
        assert_eq!(update.totals.line_count, 2);

        let dto = get_cart(&cart, &media);
        assert_eq!(dto.items[0].line_total, Money::from_cents(3980));
        assert_eq!(dto.items[1].item.selected_brand, "Kelon");

        let err = add_to_cart(&catalog, &cart, &media, "NOPE", 1, None, Language::EnUs)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);

        let update = update_cart_item(&cart, "P-1", 0).await.unwrap();
        assert_eq!(update.summary, "Removed P-1");
        assert_eq!(update.totals.line_count, 0);

        let update = remove_from_cart(&cart, "P-1").await;
        assert_eq!(update.summary, "P-1 was not in the cart");
    }
}
