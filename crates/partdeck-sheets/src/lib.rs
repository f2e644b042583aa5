//! # partdeck-sheets: Spreadsheet Export & Import
//!
//! The two places PartDeck meets `.xlsx` files.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   catalog.xlsx ──► import_catalog() ──► products_data.json ──► index    │
//! │                     (calamine)                                          │
//! │                                                                         │
//! │   Cart lines ──► OrderList ──► Order_List_2024-05-01.xlsx               │
//! │   + image bytes   (rust_xlsxwriter)                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is blocking file I/O. Async callers run it on
//! `tokio::task::spawn_blocking`.

pub mod error;
pub mod export;
pub mod import;

pub use error::{SheetsError, SheetsResult};
pub use export::{ExportSummary, OrderList};
pub use import::{import_catalog, ImportedCatalog, SheetReport};
