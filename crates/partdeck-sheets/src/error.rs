//! # Sheets Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for spreadsheet operations.
pub type SheetsResult<T> = Result<T, SheetsError>;

#[derive(Debug, Error)]
pub enum SheetsError {
    /// Nothing to export.
    #[error("Cart is empty, nothing to export")]
    EmptyCart,

    /// Building or saving the workbook failed. No file is left behind.
    #[error("Failed to write workbook {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// The input workbook could not be opened or read.
    #[error("Failed to read workbook {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The input workbook has no sheets.
    #[error("Workbook has no sheets: {0}")]
    NoSheets(PathBuf),

    /// File system error around the workbook.
    #[error("I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

impl SheetsError {
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SheetsError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SheetsError::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SheetsError::Io {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
