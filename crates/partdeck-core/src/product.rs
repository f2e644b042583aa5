//! # Product
//!
//! An indexed catalog row: the raw [`ProductRecord`] plus the sheet it came
//! from and the lowercase search shadows derived from it.
//!
//! ## Shadow Fields
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Raw record                          SearchFields (lowercase)           │
//! │  ─────────                           ───────────────────────            │
//! │  CODE          "X-100"        ──►    code          "x-100"              │
//! │  Original CODE "OEM 77"       ──►    original_code "oem 77"             │
//! │  MODEL         "Widget Pro"   ──►    model         "widget pro"         │
//! │  ...                                 ...                                │
//! │  (sheet)       "Filters"      ──►    sheet_name    "filters"            │
//! │                                                                         │
//! │  Computed once in Product::new. There is no setter.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::money::Money;
use crate::record::{value_to_text, Field, ProductRecord};

// =============================================================================
// Search Fields
// =============================================================================

/// Lowercase copies of the searchable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFields {
    code: String,
    original_code: String,
    model: String,
    name: String,
    fits_machine: String,
    specs: String,
    brand: String,
    kind: String,
    description: String,
    sheet_name: String,
}

impl SearchFields {
    fn derive(sheet_name: &str, record: &ProductRecord) -> Self {
        let lower = |field: Field| {
            record
                .text(field)
                .map(|s| s.to_lowercase())
                .unwrap_or_default()
        };
        SearchFields {
            code: lower(Field::Code),
            original_code: lower(Field::OriginalCode),
            model: lower(Field::Model),
            name: lower(Field::Name),
            fits_machine: lower(Field::FitsMachine),
            specs: lower(Field::Specs),
            brand: lower(Field::Brand),
            kind: lower(Field::Type),
            description: lower(Field::Description),
            sheet_name: sheet_name.to_lowercase(),
        }
    }

    /// All shadows in match order.
    pub fn as_array(&self) -> [&str; 10] {
        [
            &self.code,
            &self.original_code,
            &self.model,
            &self.name,
            &self.fits_machine,
            &self.specs,
            &self.brand,
            &self.kind,
            &self.description,
            &self.sheet_name,
        ]
    }

    /// True if any shadow contains `token`.
    pub fn contains(&self, token: &str) -> bool {
        self.as_array().iter().any(|field| field.contains(token))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product as held by the index.
#[derive(Debug, Clone)]
pub struct Product {
    sheet_name: String,
    position: usize,
    record: ProductRecord,
    search: SearchFields,
}

impl Product {
    /// Builds a product and its search shadows.
    pub fn new(sheet_name: impl Into<String>, position: usize, record: ProductRecord) -> Self {
        let sheet_name = sheet_name.into();
        let search = SearchFields::derive(&sheet_name, &record);
        Product {
            sheet_name,
            position,
            record,
            search,
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Position in the whole index.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn record(&self) -> &ProductRecord {
        &self.record
    }

    pub fn search_fields(&self) -> &SearchFields {
        &self.search
    }

    /// Raw product code, if the row has one.
    pub fn code(&self) -> Option<String> {
        self.record.text(Field::Code).filter(|c| !c.is_empty())
    }

    /// Product code, or `ITEM_{position}` for rows without one.
    pub fn display_code(&self) -> String {
        self.code()
            .unwrap_or_else(|| format!("ITEM_{}", self.position))
    }

    /// Supplier code; falls back to the product code.
    pub fn original_code(&self) -> Option<String> {
        self.record
            .text(Field::OriginalCode)
            .filter(|c| !c.is_empty())
            .or_else(|| self.code())
    }

    /// Model, else name.
    pub fn display_name(&self) -> Option<String> {
        self.record.first_text(&[Field::Model, Field::Name])
    }

    /// Compatibility text shown on cards: fits-machine, else specs.
    pub fn card_specs(&self) -> Option<String> {
        self.record.first_text(&[Field::FitsMachine, Field::Specs])
    }

    /// Specs carried into a cart line: specs, else fits-machine.
    pub fn line_specs(&self) -> Option<String> {
        self.record.first_text(&[Field::Specs, Field::FitsMachine])
    }

    pub fn brand(&self) -> Option<String> {
        self.record.text(Field::Brand).filter(|b| !b.is_empty())
    }

    /// Unit price; absent or unparsable prices are zero.
    pub fn price(&self) -> Money {
        self.record
            .get(Field::Price)
            .and_then(|v| Money::parse_decimal(&value_to_text(v)))
            .unwrap_or_default()
    }

    /// Image reference stored in the row itself, if any.
    pub fn image_hint(&self) -> Option<String> {
        self.record.text(Field::Image).filter(|s| !s.is_empty())
    }

    /// Remaining fields for the detail view, in file order.
    ///
    /// Identity fields shown in the header (code, model, name, image, sheet),
    /// internal `_`-prefixed bookkeeping and empty values are skipped.
    pub fn detail_fields(&self) -> Vec<DetailField> {
        const HEADER_FIELDS: [Field; 5] = [
            Field::Code,
            Field::OriginalCode,
            Field::Model,
            Field::Name,
            Field::Image,
        ];
        self.record
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .filter(|(key, _)| !key.eq_ignore_ascii_case("sheetName"))
            .filter(|(key, _)| !HEADER_FIELDS.iter().any(|f| f.matches_key(key)))
            .map(|(key, value)| DetailField {
                label: key.clone(),
                value: value_to_text(value),
            })
            .filter(|field| !field.value.trim().is_empty())
            .collect()
    }
}

/// One label/value pair in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn product(sheet: &str, value: Value) -> Product {
        match value {
            Value::Object(map) => Product::new(sheet, 0, ProductRecord::new(map)),
            _ => panic!("test product must be an object"),
        }
    }

    #[test]
    fn test_shadows_are_lowercase() {
        let p = product(
            "Filters",
            json!({ "CODE": "X-100", "MODEL": "Widget PRO", "brand": "Kelon" }),
        );
        let fields = p.search_fields().as_array();
        assert_eq!(fields[0], "x-100");
        assert_eq!(fields[2], "widget pro");
        assert_eq!(fields[6], "kelon");
        assert_eq!(fields[9], "filters");
    }

    #[test]
    fn test_display_fallbacks() {
        let p = product("A", json!({ "NAME": "Pump", "SPECS": "12V", "FITS MACHINE": "KX" }));
        assert_eq!(p.display_name().as_deref(), Some("Pump"));
        assert_eq!(p.card_specs().as_deref(), Some("KX"));
        assert_eq!(p.line_specs().as_deref(), Some("12V"));
        assert_eq!(p.display_code(), "ITEM_0");
    }

    #[test]
    fn test_original_code_defaults_to_code() {
        let p = product("A", json!({ "CODE": "000123" }));
        assert_eq!(p.original_code().as_deref(), Some("000123"));

        let p = product("A", json!({ "CODE": "000123", "Original CODE": "OEM-9" }));
        assert_eq!(p.original_code().as_deref(), Some("OEM-9"));
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(product("A", json!({ "PRICE": 12.5 })).price().cents(), 1250);
        assert_eq!(product("A", json!({ "price": "3" })).price().cents(), 300);
        assert_eq!(product("A", json!({ "PRICE": "n/a" })).price().cents(), 0);
        assert!(product("A", json!({})).price().is_zero());
    }

    #[test]
    fn test_detail_fields_skip_header_and_internal() {
        let p = product(
            "A",
            json!({
                "CODE": "X1",
                "MODEL": "Widget",
                "SPECS": "12V",
                "_excel_row": 3,
                "NOTES": "",
                "TYPE": "Valve"
            }),
        );
        let labels: Vec<String> = p.detail_fields().into_iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["SPECS".to_string(), "TYPE".to_string()]);
    }
}
