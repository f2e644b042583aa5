//! # Search Engine
//!
//! Free-text search over the product index.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "  Kelon  PUMP "                                                       │
//! │       │ trim + lowercase + split on whitespace                          │
//! │       ▼                                                                 │
//! │  tokens: ["kelon", "pump"]                                              │
//! │                                                                         │
//! │  0 tokens ──► no results (caller leaves search mode)                    │
//! │  1 token  ──► any shadow field contains it                              │
//! │  N tokens ──► EVERY token is contained in SOME shadow field             │
//! │                                                                         │
//! │  Fields: code, original code, model, name, fits machine, specs,         │
//! │          brand, type, description, sheet name                           │
//! │                                                                         │
//! │  Results keep index order. No ranking.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::index::CatalogIndex;
use crate::product::Product;

/// A normalised query: lowercase whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    /// Normalises raw input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<SearchQuery> {
        let tokens: Vec<String> = raw
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(SearchQuery { tokens })
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True if the product satisfies every token.
    pub fn matches(&self, product: &Product) -> bool {
        let fields = product.search_fields();
        match self.tokens.as_slice() {
            [single] => fields.contains(single),
            tokens => tokens.iter().all(|token| fields.contains(token)),
        }
    }
}

/// Global positions of the matching products, in index order.
///
/// Blank queries return an empty list.
pub fn search_positions(index: &CatalogIndex, raw: &str) -> Vec<usize> {
    let Some(query) = SearchQuery::parse(raw) else {
        return Vec::new();
    };
    index
        .products()
        .iter()
        .enumerate()
        .filter(|(_, product)| query.matches(product))
        .map(|(position, _)| position)
        .collect()
}

/// Matching products, in index order.
pub fn search<'a>(index: &'a CatalogIndex, raw: &str) -> Vec<&'a Product> {
    search_positions(index, raw)
        .into_iter()
        .filter_map(|i| index.product(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> CatalogIndex {
        CatalogIndex::from_value(json!({
            "Filters": [
                { "CODE": "F-100", "MODEL": "Oil Filter", "BRAND": "Kelon" },
                { "CODE": "F-200", "MODEL": "Air Filter", "BRAND": "Lixiong" }
            ],
            "Pumps": [
                { "CODE": "P-1", "NAME": "Water Pump", "FITS MACHINE": "Kelon KX-9" },
                { "CODE": "P-2", "NAME": "Fuel Pump", "DESCRIPTION": "diesel" }
            ]
        }))
        .unwrap()
    }

    fn codes(products: Vec<&Product>) -> Vec<String> {
        products.into_iter().map(|p| p.display_code()).collect()
    }

    #[test]
    fn test_single_token_any_field() {
        let index = catalog();
        assert_eq!(codes(search(&index, "kelon")), vec!["F-100", "P-1"]);
        assert_eq!(codes(search(&index, "DIESEL")), vec!["P-2"]);
    }

    #[test]
    fn test_multi_token_requires_all() {
        let index = catalog();
        assert_eq!(codes(search(&index, "kelon pump")), vec!["P-1"]);
        assert!(search(&index, "kelon diesel").is_empty());
    }

    #[test]
    fn test_tokens_may_match_different_fields() {
        let index = catalog();
        // "filter" hits model, "lixiong" hits brand
        assert_eq!(codes(search(&index, "lixiong  filter")), vec!["F-200"]);
    }

    #[test]
    fn test_sheet_name_is_searchable() {
        let index = catalog();
        assert_eq!(search(&index, "pumps").len(), 2);
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let index = catalog();
        assert!(search(&index, "").is_empty());
        assert!(search(&index, "   \t ").is_empty());
        assert!(SearchQuery::parse("  ").is_none());
    }

    #[test]
    fn test_no_match() {
        let index = catalog();
        assert!(search(&index, "zzz").is_empty());
    }

    #[test]
    fn test_result_is_exactly_the_matching_set() {
        let index = catalog();
        let query = SearchQuery::parse("filter kelon").unwrap();
        let expected: Vec<usize> = index
            .products()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                query
                    .tokens()
                    .iter()
                    .all(|t| p.search_fields().as_array().iter().any(|f| f.contains(t.as_str())))
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(search_positions(&index, "filter kelon"), expected);
        assert_eq!(expected, vec![0]);
    }
}
