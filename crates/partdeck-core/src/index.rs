//! # Product Index
//!
//! Builds the in-memory catalog from the loaded JSON document.
//!
//! ## Build Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "Filters": [ {...}, {...} ], "Pumps": [ {...} ], "Notes": "x" }      │
//! │       │                                                                 │
//! │       ▼  for each sheet key, in file order                              │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ value is array?  ── no ──► empty sheet                            │  │
//! │  │      │ yes                                                        │  │
//! │  │      ▼                                                            │  │
//! │  │ keep object entries ──► Product::new(sheet, pos, record)          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  products: [Filters#0, Filters#1, Pumps#0]   (sheet order, then row)    │
//! │  sheets:   [Filters 0..2, Pumps 2..3, Notes 3..3]                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index is rebuilt wholesale on every load; it is never patched.

use std::ops::Range;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::product::Product;
use crate::record::ProductRecord;

/// A sheet and the slice of the product list it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    range: Range<usize>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Sheet name and product count, for the sheets overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub name: String,
    pub count: usize,
}

/// The loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    sheets: Vec<Sheet>,
    products: Vec<Product>,
}

impl CatalogIndex {
    /// Parses catalog JSON text and builds the index.
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidCatalog(e.to_string()))?;
        Self::from_value(value)
    }

    /// Builds the index from an already-parsed document.
    ///
    /// ## Errors
    /// - `InvalidCatalog` if the top level is not an object
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let Value::Object(document) = value else {
            return Err(CoreError::InvalidCatalog(
                "top level must be an object keyed by sheet name".to_string(),
            ));
        };

        let mut sheets = Vec::with_capacity(document.len());
        let mut products = Vec::new();

        for (sheet_name, rows) in document {
            let start = products.len();
            if let Value::Array(rows) = rows {
                let objects = rows.into_iter().filter_map(|row| match row {
                    Value::Object(map) => Some(map),
                    _ => None,
                });
                for map in objects {
                    let position = products.len();
                    products.push(Product::new(
                        sheet_name.clone(),
                        position,
                        ProductRecord::new(map),
                    ));
                }
            }
            sheets.push(Sheet {
                name: sheet_name,
                range: start..products.len(),
            });
        }

        Ok(CatalogIndex { sheets, products })
    }

    /// Every product, in sheet order then row order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Product at a global position.
    pub fn product(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All sheets, including empty ones, in file order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Products of one sheet. `None` if no such sheet exists.
    pub fn sheet(&self, name: &str) -> Option<&[Product]> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| &self.products[s.range.clone()])
    }

    /// Global positions of one sheet's products.
    pub fn sheet_positions(&self, name: &str) -> Option<Range<usize>> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.range.clone())
    }

    /// Sheets with at least one product.
    pub fn non_empty_sheets(&self) -> Vec<SheetSummary> {
        self.sheets
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| SheetSummary {
                name: s.name.clone(),
                count: s.len(),
            })
            .collect()
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Global position of the first product with this code.
    ///
    /// Real codes win; `ITEM_{n}` then matches the codeless row at `n`.
    pub fn position_of_code(&self, code: &str) -> Option<usize> {
        self.products
            .iter()
            .position(|p| p.code().as_deref() == Some(code))
            .or_else(|| {
                self.products
                    .iter()
                    .position(|p| p.code().is_none() && p.display_code() == code)
            })
    }

    /// First product with this code.
    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        self.position_of_code(code).map(|i| &self.products[i])
    }
}
