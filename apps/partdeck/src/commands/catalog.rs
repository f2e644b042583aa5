//! # Catalog Commands
//!
//! Browsing: sheets overview, sheet listings, search, product detail.
//!
//! ## Browse Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  partdeck list Pumps --page 2                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  view.select_sheet("Pumps") ──► view.go_to_page(2)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  view.refresh_current_view() ──► ScreenDto (under the view lock)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  attach_images(): card images / gallery probed concurrently             │
//! │       │            (no lock held)                                       │
//! │       ▼                                                                 │
//! │  render::screen() or JSON                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use partdeck_core::product::DetailField;
use partdeck_core::view::{Listing, ListingSource, ProductDetail};
use partdeck_core::{Money, Pagination, Product, Screen, SheetSummary, ViewController};

use crate::error::ApiError;
use crate::state::{CartState, CatalogState, LoadOutcome, MediaState};

// =============================================================================
// DTOs
// =============================================================================

/// One product card in a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub code: String,
    pub name: Option<String>,
    pub specs: Option<String>,
    pub brand: Option<String>,
    pub price: Money,
    pub sheet: String,
    pub image: Option<String>,
    /// Quantity of this code already in the cart.
    pub in_cart: i64,
}

impl ProductCard {
    fn new(product: &Product, in_cart: i64) -> Self {
        ProductCard {
            code: product.display_code(),
            name: product.display_name(),
            specs: product.card_specs(),
            brand: product.brand(),
            price: product.price(),
            sheet: product.sheet_name().to_string(),
            image: None,
            in_cart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub showing_from: usize,
    pub showing_to: usize,
    /// Page buttons to show.
    pub window: Vec<usize>,
    pub shows_controls: bool,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageInfo {
    fn new(pagination: &Pagination) -> Self {
        let (showing_from, showing_to) = pagination.showing_range();
        PageInfo {
            current_page: pagination.current_page(),
            total_pages: pagination.total_pages(),
            total_items: pagination.total_items(),
            showing_from,
            showing_to,
            window: pagination.page_window().collect(),
            shows_controls: pagination.shows_controls(),
            has_prev: pagination.has_prev(),
            has_next: pagination.has_next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListingOrigin {
    Sheet { name: String },
    Search { term: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    pub origin: ListingOrigin,
    pub products: Vec<ProductCard>,
    pub page: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsDto {
    pub sheet_count: usize,
    pub product_count: usize,
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDto {
    pub code: String,
    pub original_code: Option<String>,
    pub name: Option<String>,
    pub sheet: String,
    pub brand: Option<String>,
    pub price: Money,
    pub fields: Vec<DetailField>,
    /// Primary image followed by gallery images.
    pub images: Vec<String>,
    pub in_cart: i64,
}

/// The current screen, ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum ScreenDto {
    Empty,
    LoadError { message: String },
    Sheets(SheetsDto),
    Listing(ListingDto),
    Detail(ProductDetailDto),
}

impl ScreenDto {
    /// Copies what a renderer needs out of a borrowed [`Screen`].
    pub fn capture(screen: Screen<'_>, cart: &CartState) -> Self {
        match screen {
            Screen::Empty => ScreenDto::Empty,
            Screen::LoadError { message } => ScreenDto::LoadError {
                message: message.to_string(),
            },
            Screen::Sheets(overview) => ScreenDto::Sheets(SheetsDto {
                sheet_count: overview.sheet_count,
                product_count: overview.product_count,
                sheets: overview.sheets,
            }),
            Screen::Listing(listing) => ScreenDto::Listing(capture_listing(listing, cart)),
            Screen::Detail(detail) => ScreenDto::Detail(capture_detail(detail, cart)),
        }
    }

    /// Fills card images or the detail gallery.
    pub async fn attach_images(&mut self, media: &MediaState) {
        match self {
            ScreenDto::Listing(listing) => {
                let codes: Vec<String> = listing.products.iter().map(|p| p.code.clone()).collect();
                if let Some(images) = media.card_images(&codes).await {
                    for (card, image) in listing.products.iter_mut().zip(images) {
                        card.image = image;
                    }
                }
            }
            ScreenDto::Detail(detail) => {
                if let Some(images) = media.gallery(&detail.code).await {
                    detail.images = images;
                }
            }
            _ => {}
        }
    }
}

fn capture_listing(listing: Listing<'_>, cart: &CartState) -> ListingDto {
    let origin = match listing.source {
        ListingSource::Sheet(name) => ListingOrigin::Sheet {
            name: name.to_string(),
        },
        ListingSource::Search { term } => ListingOrigin::Search {
            term: term.to_string(),
        },
    };
    let products = cart.with_cart(|c| {
        listing
            .products
            .iter()
            .map(|p| ProductCard::new(p, c.quantity_of(&p.display_code())))
            .collect()
    });
    ListingDto {
        origin,
        products,
        page: PageInfo::new(listing.pagination),
    }
}

fn capture_detail(detail: ProductDetail<'_>, cart: &CartState) -> ProductDetailDto {
    let product = detail.product;
    let code = product.display_code();
    ProductDetailDto {
        in_cart: cart.with_cart(|c| c.quantity_of(&code)),
        original_code: product.original_code(),
        name: product.display_name(),
        sheet: product.sheet_name().to_string(),
        brand: product.brand(),
        price: product.price(),
        fields: detail.fields,
        images: Vec::new(),
        code,
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Applies `action` to the view, then captures the resulting screen.
///
/// ## Errors
/// Whatever `action` returns; the view may already be partly changed.
pub async fn navigate<F>(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
    action: F,
) -> Result<ScreenDto, ApiError>
where
    F: FnOnce(&mut ViewController) -> Result<(), ApiError>,
{
    catalog.ensure_loaded().await?;
    let mut screen = catalog.with_view_mut(|view| {
        action(view)?;
        Ok::<_, ApiError>(ScreenDto::capture(view.refresh_current_view(), cart))
    })?;
    screen.attach_images(media).await;
    Ok(screen)
}

/// Re-renders the current view.
pub async fn current_screen(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
) -> Result<ScreenDto, ApiError> {
    navigate(catalog, cart, media, |_| Ok(())).await
}

/// Sheets overview: sheet count, product count, non-empty sheets.
pub async fn list_sheets(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
) -> Result<ScreenDto, ApiError> {
    navigate(catalog, cart, media, |view| {
        view.show_sheets();
        Ok(())
    })
    .await
}

/// One page of a sheet.
///
/// ## Errors
/// - `NotFound` for an unknown sheet
/// - `ValidationError` for a page outside `1..=total_pages`
pub async fn open_sheet(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
    name: &str,
    page: Option<usize>,
) -> Result<ScreenDto, ApiError> {
    navigate(catalog, cart, media, |view| {
        view.select_sheet(name)?;
        apply_page(view, page)
    })
    .await
}

/// Searches every sheet. Blank terms fall back to the previous listing.
///
/// ## Search Semantics
/// Terms are split on whitespace; each must occur in at least one of
/// code, original code, model, name, fits-machine, specs, brand, type,
/// description or sheet name (case-insensitive).
pub async fn search_products(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
    terms: &str,
    page: Option<usize>,
) -> Result<ScreenDto, ApiError> {
    navigate(catalog, cart, media, |view| {
        let start = Instant::now();
        let matches = view.search(terms)?;
        debug!(terms, matches, elapsed_us = start.elapsed().as_micros() as u64, "Search");
        apply_page(view, page)
    })
    .await
}

/// Detail of one product with its image gallery.
pub async fn show_product(
    catalog: &CatalogState,
    cart: &CartState,
    media: &MediaState,
    code: &str,
) -> Result<ScreenDto, ApiError> {
    navigate(catalog, cart, media, |view| Ok(view.show_detail(code)?)).await
}

/// Rebuilds the index from disk and clears the image cache.
pub async fn reload_catalog(
    catalog: &CatalogState,
    media: &MediaState,
) -> Result<LoadOutcome, ApiError> {
    catalog.reload(media).await
}

fn apply_page(view: &mut ViewController, page: Option<usize>) -> Result<(), ApiError> {
    if let Some(page) = page {
        let page = view.pagination().validate_page(page)?;
        view.go_to_page(page);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::testing::{write_catalog, CATALOG_JSON};
    use crate::state::media::testing::{media_state, write_primary};
    use partdeck_store::{Database, StoreConfig};

    struct Fixture {
        _dir: tempfile::TempDir,
        _db: Database,
        catalog: CatalogState,
        cart: CartState,
        media: MediaState,
    }

    async fn fixture(contents: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        Fixture {
            catalog: CatalogState::new(write_catalog(dir.path(), contents), 12),
            cart: CartState::load(db.cart()).await.unwrap(),
            media: media_state(dir.path()),
            _db: db,
            _dir: dir,
        }
    }

    fn many_products(n: usize) -> String {
        let rows: Vec<String> = (0..n)
            .map(|i| format!(r#"{{ "CODE": "G-{i}", "MODEL": "Gear {i}" }}"#))
            .collect();
        format!(r#"{{ "Gears": [{}] }}"#, rows.join(","))
    }

    #[tokio::test]
    async fn test_sheets_overview_skips_empty_sheets() {
        let f = fixture(CATALOG_JSON).await;
        let screen = list_sheets(&f.catalog, &f.cart, &f.media).await.unwrap();
        let ScreenDto::Sheets(sheets) = screen else {
            panic!("expected sheets overview");
        };
        assert_eq!(sheets.sheet_count, 3);
        assert_eq!(sheets.product_count, 3);
        assert_eq!(sheets.sheets.len(), 2);
    }

    #[tokio::test]
    async fn test_open_sheet_pages() {
        let f = fixture(&many_products(30)).await;

        let screen = open_sheet(&f.catalog, &f.cart, &f.media, "Gears", Some(3))
            .await
            .unwrap();
        let ScreenDto::Listing(listing) = screen else {
            panic!("expected listing");
        };
        assert_eq!(listing.products.len(), 6);
        assert_eq!(listing.page.current_page, 3);
        assert_eq!(listing.page.total_pages, 3);
        assert_eq!((listing.page.showing_from, listing.page.showing_to), (25, 30));
        assert!(listing.page.shows_controls);

        let err = open_sheet(&f.catalog, &f.cart, &f.media, "Gears", Some(4))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = open_sheet(&f.catalog, &f.cart, &f.media, "Nope", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_attaches_card_images() {
        let f = fixture(CATALOG_JSON).await;
        let root = f._dir.path().to_path_buf();
        write_primary(&root, "P-1");

        let screen = search_products(&f.catalog, &f.cart, &f.media, "pump", None)
            .await
            .unwrap();
        let ScreenDto::Listing(listing) = screen else {
            panic!("expected listing");
        };
        assert_eq!(
            listing.origin,
            ListingOrigin::Search {
                term: "pump".into()
            }
        );
        assert_eq!(listing.products.len(), 2);
        assert!(listing.products[0].image.is_some());
        assert!(listing.products[1].image.is_none());
    }

    #[tokio::test]
    async fn test_show_product_detail() {
        let f = fixture(CATALOG_JSON).await;
        let screen = show_product(&f.catalog, &f.cart, &f.media, "V-1").await.unwrap();
        let ScreenDto::Detail(detail) = screen else {
            panic!("expected detail");
        };
        assert_eq!(detail.name.as_deref(), Some("Check valve"));
        assert!(detail.fields.iter().any(|f| f.value == "brass"));

        let err = show_product(&f.catalog, &f.cart, &f.media, "NOPE").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }
}
