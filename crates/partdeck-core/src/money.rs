//! # Money Module
//!
//! Provides the `Money` type for catalog prices and cart totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Catalog price "0.1" × 3 in floating point = 0.30000000000000004        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Price text "0.10" ──► parse_decimal ──► 10 cents                     │
//! │    10 cents × 3 = 30 cents, exactly                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use partdeck_core::money::Money;
//!
//! let price = Money::parse_decimal("10.99").unwrap();
//! assert_eq!(price.cents(), 1099);
//! assert_eq!(price.multiply_quantity(2).cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// ProductRecord "PRICE" ──► Product::price() ──► CartItem.price
///                                                      │
///                                   × quantity ◄───────┘
///                                        │
///                                        ▼
///                               Cart::total_price()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use partdeck_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Parses decimal price text into cents without going through floats.
    ///
    /// ## Accepted Input
    /// - Optional sign and a leading currency symbol (`$`, `¥`, `￥`)
    /// - Thousands separators (`1,250.00`)
    /// - Any number of fraction digits; the third digit rounds half up
    ///
    /// ## Example
    /// ```rust
    /// use partdeck_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12").unwrap().cents(), 1200);
    /// assert_eq!(Money::parse_decimal("$1,250.5").unwrap().cents(), 125050);
    /// assert_eq!(Money::parse_decimal("0.125").unwrap().cents(), 13);
    /// assert!(Money::parse_decimal("call us").is_none());
    /// ```
    pub fn parse_decimal(text: &str) -> Option<Money> {
        let mut s = text.trim();
        let negative = s.starts_with('-');
        if negative {
            s = s[1..].trim_start();
        }
        for symbol in ["$", "¥", "￥"] {
            if let Some(rest) = s.strip_prefix(symbol) {
                s = rest.trim_start();
                break;
            }
        }
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        let (major_text, minor_text) = match cleaned.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (cleaned.as_str(), ""),
        };
        if major_text.is_empty() && minor_text.is_empty() {
            return None;
        }
        let all_digits = |t: &str| t.chars().all(|c| c.is_ascii_digit());
        if !all_digits(major_text) || !all_digits(minor_text) {
            return None;
        }

        let major: i64 = if major_text.is_empty() {
            0
        } else {
            major_text.parse().ok()?
        };
        let mut digits = minor_text.bytes().map(|b| i64::from(b - b'0'));
        let tens = digits.next().unwrap_or(0);
        let ones = digits.next().unwrap_or(0);
        let round = if digits.next().unwrap_or(0) >= 5 { 1 } else { 0 };

        let cents = major.checked_mul(100)?.checked_add(tens * 10 + ones + round)?;
        Some(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(Money::parse_decimal("0").unwrap().cents(), 0);
        assert_eq!(Money::parse_decimal("7.5").unwrap().cents(), 750);
        assert_eq!(Money::parse_decimal(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal("  19.99 ").unwrap().cents(), 1999);
    }

    #[test]
    fn test_parse_rounds_third_digit() {
        assert_eq!(Money::parse_decimal("1.004").unwrap().cents(), 100);
        assert_eq!(Money::parse_decimal("1.005").unwrap().cents(), 101);
    }

    #[test]
    fn test_parse_negative_and_symbols() {
        assert_eq!(Money::parse_decimal("-2.50").unwrap().cents(), -250);
        assert_eq!(Money::parse_decimal("¥ 88").unwrap().cents(), 8800);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse_decimal("").is_none());
        assert!(Money::parse_decimal(".").is_none());
        assert!(Money::parse_decimal("1.2.3").is_none());
        assert!(Money::parse_decimal("12abc").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 5].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 355);
    }
}
