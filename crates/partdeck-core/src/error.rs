//! # Error Types
//!
//! Domain-specific error types for partdeck-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  partdeck-core errors (this file)                                       │
//! │  ├── CoreError        - Catalog, cart and view failures                 │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  partdeck-store  └── StoreError   - Durable storage failures            │
//! │  partdeck-media  └── MediaError   - Image source failures               │
//! │  partdeck-sheets └── SheetsError  - Export / import failures            │
//! │                                                                         │
//! │  CLI app         └── ApiError     - What the user sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → stderr + exit code      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The catalog document could not be turned into an index.
    ///
    /// ## When This Occurs
    /// - File is not valid JSON
    /// - Top-level value is not an object keyed by sheet name
    #[error("Invalid catalog data: {0}")]
    InvalidCatalog(String),

    /// No sheet with this name exists in the loaded index.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// No product with this code exists in the loaded index.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A view operation needs catalog data that has not been loaded.
    #[error("Catalog is not loaded")]
    CatalogNotLoaded,

    /// The cart has no line for this code.
    ///
    /// ## When This Occurs
    /// - Updating the quantity of a code that was never added
    /// - Updating after the line was removed in another session
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// Export requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineNotFound("X1".to_string());
        assert_eq!(err.to_string(), "Product X1 is not in the cart");

        let err = CoreError::SheetNotFound("Filters".to_string());
        assert_eq!(err.to_string(), "Sheet not found: Filters");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: 3,
        };
        assert_eq!(err.to_string(), "page must be between 1 and 3");

        let err = ValidationError::TooShort {
            field: "verification code".to_string(),
            min: 4,
        };
        assert_eq!(
            err.to_string(),
            "verification code must be at least 4 characters"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
