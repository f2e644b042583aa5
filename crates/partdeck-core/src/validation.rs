//! # Validation Module
//!
//! Input validation for values typed by the user.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                   │
//! │  ├── Types and required arguments                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Quantities, page numbers, verification codes                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain operations (Cart, Pagination, gate)                    │
//! │  └── Invariants that depend on current state                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MIN_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed `MAX_ITEM_QUANTITY` (99 999)
///
/// ## Example
/// ```rust
/// use partdeck_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(100_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Parses a quantity typed by the user. Zero and negatives are allowed here
/// because the cart treats them as removal.
pub fn parse_quantity(input: &str) -> ValidationResult<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number".to_string(),
        })
}

/// Parses a page number typed into the "go to page" box.
///
/// ## Example
/// ```rust
/// use partdeck_core::validation::parse_page;
///
/// assert_eq!(parse_page("2", 3).unwrap(), 2);
/// assert!(parse_page("4", 3).is_err());
/// assert!(parse_page("two", 3).is_err());
/// ```
pub fn parse_page(input: &str, total_pages: usize) -> ValidationResult<usize> {
    let out_of_range = || ValidationError::OutOfRange {
        field: "page".to_string(),
        min: 1,
        max: total_pages as i64,
    };
    let page = input.trim().parse::<usize>().map_err(|_| out_of_range())?;
    if page < 1 || page > total_pages {
        return Err(out_of_range());
    }
    Ok(page)
}

/// Validates a new verification code after sanitising.
///
/// ## Rules
/// - At least 4 characters
pub fn validate_verification_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "verification code".to_string(),
        });
    }
    if code.chars().count() < MIN_CODE_LENGTH {
        return Err(ValidationError::TooShort {
            field: "verification code".to_string(),
            min: MIN_CODE_LENGTH,
        });
    }
    Ok(())
}
