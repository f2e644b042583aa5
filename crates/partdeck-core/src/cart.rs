//! # Cart
//!
//! The order cart: a ledger of lines keyed by product code and brand.
//!
//! ## Line Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add(X1, 2, kelon)    ──► [X1/kelon ×2]                                 │
//! │  add(X1, 3, kelon)    ──► [X1/kelon ×5]              same key: merge    │
//! │  add(X1, 1, lixiong)  ──► [X1/kelon ×5, X1/lixiong ×1]  new key: push   │
//! │                                                                         │
//! │  update(X1, 7)        ──► first X1 line in insertion order ×7           │
//! │  update(X1, 0)        ──► same as remove(X1)                            │
//! │  remove(X1)           ──► every X1 line, whatever the brand             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `(code, selected_brand_key)` is unique across lines
//! - Every line has `quantity >= 1`
//!
//! Persistence and change notifications live outside this crate; the cart
//! itself is a plain value.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::i18n::Language;
use crate::money::Money;
use crate::product::Product;
use crate::validation::validate_quantity;
use crate::DEFAULT_BRAND_KEY;

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart.
///
/// Product data is copied in when the line is created, so the line keeps
/// displaying correctly after the catalog is reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub code: String,
    pub original_code: String,
    pub name: String,
    pub sheet_name: String,
    pub specs: String,
    pub quantity: i64,
    #[serde(default)]
    pub brand: Option<String>,
    pub selected_brand_key: String,
    pub selected_brand: String,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    fn from_product(
        product: &Product,
        quantity: i64,
        brand_key: &str,
        language: Language,
        known_image: Option<String>,
    ) -> Self {
        let code = product.display_code();
        CartItem {
            original_code: product.original_code().unwrap_or_else(|| code.clone()),
            code,
            name: product
                .display_name()
                .unwrap_or_else(|| language.text().no_products.to_string()),
            sheet_name: product.sheet_name().to_string(),
            specs: product.line_specs().unwrap_or_default(),
            quantity,
            brand: product.brand(),
            selected_brand_key: brand_key.to_string(),
            selected_brand: language.brand_label(brand_key).to_string(),
            price: product.price(),
            image: known_image,
        }
    }

    /// Price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    fn is_line(&self, code: &str, brand_key: &str) -> bool {
        self.code == code && self.selected_brand_key == brand_key
    }
}

/// What `Cart::add` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// An existing line's quantity was increased.
    Merged { code: String, brand_key: String },
    /// A new line was appended. `needs_image` is set when no image was known.
    Created {
        code: String,
        brand_key: String,
        needs_image: bool,
    },
}

// =============================================================================
// Cart
// =============================================================================

/// The order cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from stored lines, dropping lines that break the
    /// invariants (quantity outside `1..=MAX_ITEM_QUANTITY`, duplicate key).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            if validate_quantity(item.quantity).is_err()
                || cart.line(&item.code, &item.selected_brand_key).is_some()
            {
                continue;
            }
            cart.items.push(item);
        }
        cart
    }

    /// Adds a product under a brand key, merging with an existing line.
    ///
    /// ## Arguments
    /// * `brand_key` - Blank keys fall back to `no_brand`
    /// * `known_image` - Image already discovered for this code, if any
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is outside `1..=MAX_ITEM_QUANTITY`, or a
    ///   merge would push the line past it; the cart is unchanged
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i64,
        brand_key: &str,
        language: Language,
        known_image: Option<String>,
    ) -> CoreResult<AddOutcome> {
        validate_quantity(quantity)?;
        let brand_key = match brand_key.trim() {
            "" => DEFAULT_BRAND_KEY,
            key => key,
        };
        let code = product.display_code();

        if let Some(item) = self.items.iter_mut().find(|i| i.is_line(&code, brand_key)) {
            let merged = item.quantity.saturating_add(quantity);
            validate_quantity(merged)?;
            item.quantity = merged;
            item.selected_brand = language.brand_label(brand_key).to_string();
            return Ok(AddOutcome::Merged {
                code,
                brand_key: brand_key.to_string(),
            });
        }

        let needs_image = known_image.is_none();
        self.items.push(CartItem::from_product(
            product,
            quantity,
            brand_key,
            language,
            known_image,
        ));
        Ok(AddOutcome::Created {
            code,
            brand_key: brand_key.to_string(),
            needs_image,
        })
    }

    /// Fills the image of a line that still exists and has none.
    ///
    /// ## Returns
    /// `true` if a line was updated.
    pub fn set_image(&mut self, code: &str, brand_key: &str, image: String) -> bool {
        match self
            .items
            .iter_mut()
            .find(|i| i.is_line(code, brand_key) && i.image.is_none())
        {
            Some(item) => {
                item.image = Some(image);
                true
            }
            None => false,
        }
    }

    /// Sets the quantity of the first line with this code.
    ///
    /// `quantity <= 0` removes every line with the code, like [`Cart::remove`].
    ///
    /// ## Errors
    /// - `LineNotFound` if no line has this code (only for positive quantities)
    /// - `Validation` above `MAX_ITEM_QUANTITY`; the cart is unchanged
    pub fn update(&mut self, code: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(code);
            return Ok(());
        }
        validate_quantity(quantity)?;
        match self.items.iter_mut().find(|i| i.code == code) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound(code.to_string())),
        }
    }

    /// Removes every line with this code. Returns how many were removed.
    pub fn remove(&mut self, code: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i.code != code);
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn lines(&self) -> &[CartItem] {
        &self.items
    }

    pub fn line(&self, code: &str, brand_key: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.is_line(code, brand_key))
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across lines.
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of price × quantity across lines.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total quantity ordered for a code across brands.
    pub fn quantity_of(&self, code: &str) -> i64 {
        self.items
            .iter()
            .filter(|i| i.code == code)
            .map(|i| i.quantity)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart totals summary, published after every change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductRecord;
    use serde_json::{json, Value};

    fn product(value: Value) -> Product {
        match value {
            Value::Object(map) => Product::new("Filters", 0, ProductRecord::new(map)),
            _ => panic!("test product must be an object"),
        }
    }

    fn widget() -> Product {
        product(json!({ "CODE": "X1", "MODEL": "Widget", "PRICE": "2.50", "SPECS": "12V" }))
    }

    #[test]
    fn test_add_creates_line_from_product() {
        let mut cart = Cart::new();
        let outcome = cart
            .add(&widget(), 2, "kelon", Language::EnUs, None)
            .unwrap();

        assert_eq!(
            outcome,
            AddOutcome::Created {
                code: "X1".to_string(),
                brand_key: "kelon".to_string(),
                needs_image: true
            }
        );
        let line = &cart.lines()[0];
        assert_eq!(line.name, "Widget");
        assert_eq!(line.original_code, "X1");
        assert_eq!(line.specs, "12V");
        assert_eq!(line.selected_brand, "Kelon");
        assert_eq!(line.sheet_name, "Filters");
        assert_eq!(line.price.cents(), 250);
    }

    #[test]
    fn test_same_code_and_brand_merges() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2, "kelon", Language::EnUs, None).unwrap();
        let outcome = cart
            .add(&widget(), 3, "kelon", Language::ZhCn, None)
            .unwrap();

        assert!(matches!(outcome, AddOutcome::Merged { .. }));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.lines()[0].selected_brand, "科龙");
    }

    #[test]
    fn test_different_brand_creates_second_line() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2, "kelon", Language::EnUs, None).unwrap();
        cart.add(&widget(), 1, "lixiong", Language::EnUs, None).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.quantity_of("X1"), 3);
    }

    #[test]
    fn test_blank_brand_defaults() {
        let mut cart = Cart::new();
        cart.add(&widget(), 1, " ", Language::EnUs, None).unwrap();
        assert_eq!(cart.lines()[0].selected_brand_key, "no_brand");
        assert_eq!(cart.lines()[0].selected_brand, "No Brand");
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut cart = Cart::new();
        let result = cart.add(&widget(), 0, "kelon", Language::EnUs, None);
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_cap_leaves_cart_untouched() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(&widget(), i64::MAX, "kelon", Language::EnUs, None),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());

        cart.add(&widget(), 99_999, "kelon", Language::EnUs, None).unwrap();
        let before = cart.clone();
        assert!(matches!(
            cart.add(&widget(), 1, "kelon", Language::EnUs, None),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.update("X1", i64::MAX),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.total_items(), 99_999);
    }

    #[test]
    fn test_huge_price_saturates_instead_of_wrapping() {
        let mut cart = Cart::new();
        let pricey = product(json!({ "CODE": "Z9", "PRICE": "90000000000000000" }));
        cart.add(&pricey, 99_999, "no_brand", Language::EnUs, None).unwrap();
        cart.add(&widget(), 1, "kelon", Language::EnUs, None).unwrap();
        assert!(cart.total_price().cents() > 0);
    }

    #[test]
    fn test_update_first_line_in_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&widget(), 2, "kelon", Language::EnUs, None).unwrap();
        cart.add(&widget(), 1, "lixiong", Language::EnUs, None).unwrap();

        cart.update("X1", 9).unwrap();
        assert_eq!(cart.lines()[0].quantity, 9);
        assert_eq!(cart.lines()[1].quantity, 1);

        assert!(matches!(
            cart.update("missing", 1),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_update_zero_equals_remove() {
        let mut a = Cart::new();
        a.add(&widget(), 2, "kelon", Language::EnUs, None).unwrap();
        a.add(&widget(), 1, "lixiong", Language::EnUs, None).unwrap();
        let other = product(json!({ "CODE": "Y1" }));
        a.add(&other, 1, "no_brand", Language::EnUs, None).unwrap();
        let mut b = a.clone();

        a.update("X1", 0).unwrap();
        assert_eq!(b.remove("X1"), 2);
        assert_eq!(a, b);
        assert_eq!(a.line_count(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(&widget(), 3, "kelon", Language::EnUs, None).unwrap();
        let cheap = product(json!({ "CODE": "Y1", "PRICE": 1 }));
        cart.add(&cheap, 2, "no_brand", Language::EnUs, None).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.total_price.cents(), 750 + 200);
    }

    #[test]
    fn test_set_image_only_fills_missing() {
        let mut cart = Cart::new();
        cart.add(&widget(), 1, "kelon", Language::EnUs, None).unwrap();

        assert!(cart.set_image("X1", "kelon", "images/X1.png".to_string()));
        assert!(!cart.set_image("X1", "kelon", "other.png".to_string()));
        assert!(!cart.set_image("X1", "lixiong", "x.png".to_string()));
        assert_eq!(cart.lines()[0].image.as_deref(), Some("images/X1.png"));
    }

    #[test]
    fn test_known_image_is_used() {
        let mut cart = Cart::new();
        let outcome = cart
            .add(
                &widget(),
                1,
                "kelon",
                Language::EnUs,
                Some("images/X1.png".to_string()),
            )
            .unwrap();
        assert!(matches!(
            outcome,
            AddOutcome::Created { needs_image: false, .. }
        ));
    }

    #[test]
    fn test_ledger_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add(&widget(), 1, "kelon", Language::EnUs, None).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["selectedBrandKey"], "kelon");

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_from_items_drops_invalid_lines() {
        let mut cart = Cart::new();
        cart.add(&widget(), 1, "kelon", Language::EnUs, None).unwrap();
        let mut items = cart.lines().to_vec();
        items.push(items[0].clone());
        let mut zero = items[0].clone();
        zero.selected_brand_key = "lixiong".to_string();
        zero.quantity = 0;
        items.push(zero);

        let rebuilt = Cart::from_items(items);
        assert_eq!(rebuilt.line_count(), 1);
    }
}
