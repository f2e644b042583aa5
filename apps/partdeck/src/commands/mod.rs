//! # Commands Module
//!
//! Everything the CLI and the interactive shell can ask PartDeck to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Sheets, listings, search, product detail, refresh
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── export.rs   ◄─── Order list workbook
//! ├── import.rs   ◄─── Catalog workbook to products_data.json
//! ├── gate.rs     ◄─── Login, logout, status, verification codes
//! ├── media.rs    ◄─── Product image lookup
//! └── prefs.rs    ◄─── UI language
//! ```
//!
//! ## How Commands Work
//! Each command takes only the state it needs and returns a serializable
//! DTO. `render` turns a DTO into terminal text; `--json` prints it as is.
//!
//! ```rust,ignore
//! // Only needs the catalog
//! async fn reload_catalog(catalog: &CatalogState, media: &MediaState)
//!
//! // Only needs the cart
//! async fn clear_cart(cart: &CartState)
//!
//! // Needs both
//! async fn add_to_cart(catalog: &CatalogState, cart: &CartState, ...)
//! ```

pub mod cart;
pub mod catalog;
pub mod export;
pub mod gate;
pub mod import;
pub mod media;
pub mod prefs;
