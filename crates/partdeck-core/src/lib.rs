//! # partdeck-core: Pure Catalog Logic for PartDeck
//!
//! Everything PartDeck knows about products, searching, paging and the
//! order cart lives here as plain data and functions. Nothing in this crate
//! touches the disk, the network or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PartDeck Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    partdeck (CLI / shell)                       │   │
//! │  │    sheets ──► list ──► search ──► show ──► cart ──► export     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ partdeck-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   index   │  │  search   │  │pagination │  │   cart    │  │   │
//! │  │   │  Product  │  │SearchQuery│  │ Pagination│  │   Cart    │  │   │
//! │  │   │  Sheets   │  │  tokens   │  │  window   │  │ CartItem  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │          ┌───────────┐  ┌───────────┐  ┌───────────┐           │   │
//! │  │          │   view    │  │   gate    │  │   i18n    │           │   │
//! │  │          └───────────┘  └───────────┘  └───────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                │                    │                    │              │
//! │        partdeck-store        partdeck-media      partdeck-sheets        │
//! │       (SQLite kv state)    (image discovery)    (xlsx in / out)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`record`] - Raw catalog rows and field-name candidates
//! - [`product`] - Product view over a record, with precomputed search text
//! - [`index`] - Sheets and products built from the catalog document
//! - [`search`] - Token search over the index
//! - [`pagination`] - Page math and the visible page window
//! - [`cart`] - Order cart keyed by product code and brand
//! - [`view`] - Browsing state machine
//! - [`gate`] - Verification-code gate policy
//! - [`i18n`] - Languages, brand labels, export strings
//! - [`money`] - Integer-cent prices
//! - [`validation`] - User input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use partdeck_core::{CatalogIndex, ViewController};
//!
//! let index = CatalogIndex::from_json_str(
//!     r#"{ "Pumps": [ { "CODE": "P-1", "MODEL": "Water pump" } ] }"#,
//! ).unwrap();
//!
//! let mut view = ViewController::new(12);
//! view.load(index);
//! assert_eq!(view.search("pump").unwrap(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod gate;
pub mod i18n;
pub mod index;
pub mod money;
pub mod pagination;
pub mod product;
pub mod record;
pub mod search;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use i18n::Language;
pub use index::{CatalogIndex, SheetSummary};
pub use money::Money;
pub use pagination::Pagination;
pub use product::Product;
pub use view::{Screen, ViewController, ViewKind};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products shown per listing page.
pub const ITEMS_PER_PAGE: usize = 12;

/// Page buttons shown at most in the pagination window.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Brand key used when a line is added without choosing a brand.
pub const DEFAULT_BRAND_KEY: &str = "no_brand";

/// Largest quantity a single cart line may hold.
pub const MAX_ITEM_QUANTITY: i64 = 99_999;

/// Longest accepted gate input after sanitising.
pub const MAX_INPUT_LENGTH: usize = 100;

/// Shortest verification code a user may set.
pub const MIN_CODE_LENGTH: usize = 4;

/// Numbered gallery images probed per product, `(1)` through `(8)`.
pub const MAX_VARIANT_IMAGES: u32 = 8;
