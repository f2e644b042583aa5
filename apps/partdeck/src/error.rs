//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PartDeck                               │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ├── StoreError::QueryFailed ─────────┐                          │
//! │         ├── CoreError::ProductNotFound ──────┤                          │
//! │         ├── SheetsError::EmptyCart ──────────┼──► ApiError { code, msg }│
//! │         ├── MediaError::InvalidRoot ─────────┤            │             │
//! │         └── ConfigError::Parse ──────────────┘            │             │
//! │                                                           ▼             │
//! │                                   stderr: "error: Product not found"    │
//! │                                   exit code: ErrorCode::exit_code()     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use partdeck_core::{CoreError, ValidationError};
use partdeck_media::MediaError;
use partdeck_sheets::SheetsError;
use partdeck_store::StoreError;

/// Error returned from commands.
///
/// ## Serialization
/// With `--json` this is what a script receives on failure:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: X1"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, sheet or cart line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Catalog file missing or malformed
    CatalogError,

    /// Local store failed
    StorageError,

    /// Export or import failed
    SpreadsheetError,

    /// Image root misconfigured or unreadable
    MediaError,

    /// Configuration file or value invalid
    ConfigError,

    /// Verification required, rejected or locked
    AccessDenied,

    /// Cart operation failed
    CartError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this error.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::AccessDenied => 4,
            ErrorCode::CatalogError => 5,
            ErrorCode::CartError | ErrorCode::SpreadsheetError => 6,
            ErrorCode::ConfigError => 7,
            ErrorCode::StorageError | ErrorCode::MediaError | ErrorCode::Internal => 1,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::AccessDenied, message)
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CatalogError, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidCatalog(reason) => ApiError::catalog(reason),
            CoreError::SheetNotFound(name) => ApiError::not_found("Sheet", &name),
            CoreError::ProductNotFound(code) => ApiError::not_found("Product", &code),
            CoreError::CatalogNotLoaded => ApiError::catalog("Catalog is not loaded"),
            CoreError::LineNotFound(code) => {
                ApiError::new(ErrorCode::CartError, format!("Product {} is not in the cart", code))
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, "Cart is empty"),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Local store connection failed")
            }
            StoreError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Local store migration failed")
            }
            StoreError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageError, "Local store is busy")
            }
            other => {
                // Log the detail, show a generic message
                tracing::error!("Store operation failed: {}", other);
                ApiError::new(ErrorCode::StorageError, "Local store operation failed")
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(path) => ApiError::not_found("Image", &path),
            other => ApiError::new(ErrorCode::MediaError, other.to_string()),
        }
    }
}

impl From<SheetsError> for ApiError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::EmptyCart => ApiError::new(ErrorCode::CartError, "Cart is empty, nothing to export"),
            other => ApiError::new(ErrorCode::SpreadsheetError, other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Failures loading, validating or saving `catalog.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
