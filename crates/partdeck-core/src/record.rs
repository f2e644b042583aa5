//! # Product Records
//!
//! A catalog row is an ordered map of loosely-named fields. Different sheets
//! spell the same column differently (`CODE`, `code`, `Code`), so every read
//! goes through a [`Field`] with an explicit fallback list.
//!
//! ## Lookup Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record.text(Field::Code)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  candidates: ["CODE", "code"]                                           │
//! │       │                                                                 │
//! │       ├── "CODE" exact key?            ──► value (if not null)          │
//! │       ├── key equal ignoring case?     ──► value (if not null)          │
//! │       ├── "code" exact key?            ──► value (if not null)          │
//! │       └── key equal ignoring case?     ──► value (if not null)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  None                                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Logical Fields
// =============================================================================

/// A logical product field and the raw keys it may be stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Code,
    OriginalCode,
    Model,
    Name,
    FitsMachine,
    Specs,
    Brand,
    Type,
    Description,
    Price,
    Image,
}

impl Field {
    /// Raw keys tried in order.
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Code => &["CODE", "code"],
            Field::OriginalCode => &["Original CODE", "originalCode"],
            Field::Model => &["MODEL", "model"],
            Field::Name => &["NAME", "name"],
            Field::FitsMachine => &["FITS MACHINE", "fits machine"],
            Field::Specs => &["SPECS", "specs"],
            Field::Brand => &["BRAND", "brand"],
            Field::Type => &["TYPE", "type"],
            Field::Description => &["DESCRIPTION", "description"],
            Field::Price => &["PRICE", "price"],
            Field::Image => &["IMAGE", "image"],
        }
    }

    /// Returns true if `key` is one of this field's spellings (ignoring case).
    pub fn matches_key(self, key: &str) -> bool {
        self.candidates()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(key))
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// One raw catalog row, field order preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord {
    fields: Map<String, Value>,
}

impl ProductRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        ProductRecord { fields }
    }

    /// Raw value for a logical field.
    pub fn get(&self, field: Field) -> Option<&Value> {
        field
            .candidates()
            .iter()
            .find_map(|candidate| self.get_key(candidate))
    }

    /// Raw value for a single key: exact match first, then ASCII case-insensitive.
    /// Null values count as absent.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        let exact = self.fields.get(key).filter(|v| !v.is_null());
        exact.or_else(|| {
            self.fields
                .iter()
                .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
                .map(|(_, v)| v)
        })
    }

    /// Display text for a logical field. Empty strings are returned as-is.
    pub fn text(&self, field: Field) -> Option<String> {
        self.get(field).map(value_to_text)
    }

    /// First non-empty text among several logical fields.
    pub fn first_text(&self, fields: &[Field]) -> Option<String> {
        fields
            .iter()
            .filter_map(|f| self.text(*f))
            .find(|s| !s.is_empty())
    }

    /// Iterates raw entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for ProductRecord {
    fn from(fields: Map<String, Value>) -> Self {
        ProductRecord::new(fields)
    }
}

/// Converts a JSON value to display text.
///
/// Integral floats drop their fractional part (`12.0` → `"12"`), nested
/// values render as compact JSON and null renders empty.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ProductRecord {
        match value {
            Value::Object(map) => ProductRecord::new(map),
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_exact_key_wins_over_case_insensitive() {
        let r = record(json!({ "Code": "lower", "CODE": "upper" }));
        assert_eq!(r.text(Field::Code).as_deref(), Some("upper"));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let r = record(json!({ "Model": "Widget" }));
        assert_eq!(r.text(Field::Model).as_deref(), Some("Widget"));
    }

    #[test]
    fn test_null_is_absent() {
        let r = record(json!({ "CODE": null, "code": "X1" }));
        assert_eq!(r.text(Field::Code).as_deref(), Some("X1"));
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(value_to_text(&json!(12)), "12");
        assert_eq!(value_to_text(&json!(12.0)), "12");
        assert_eq!(value_to_text(&json!(1.5)), "1.5");
        assert_eq!(value_to_text(&json!(true)), "true");
    }

    #[test]
    fn test_first_text_skips_empty() {
        let r = record(json!({ "MODEL": "", "NAME": "Pump" }));
        assert_eq!(
            r.first_text(&[Field::Model, Field::Name]).as_deref(),
            Some("Pump")
        );
    }

    #[test]
    fn test_field_order_preserved() {
        let r = record(json!({ "z": 1, "a": 2, "m": 3 }));
        let keys: Vec<&str> = r.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
