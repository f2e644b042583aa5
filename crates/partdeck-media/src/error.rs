//! # Media Error Types
//!
//! Probe failures never leave this crate: a failed probe means "no image".
//! These errors cover building a source and reading bytes directly.

use thiserror::Error;

/// Result type alias for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Image root is neither a usable directory path nor an http(s) URL.
    #[error("Invalid image root: {0}")]
    InvalidRoot(String),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Nothing at the requested path.
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Reading from the source failed.
    ///
    /// ## When This Occurs
    /// - Permission denied on a local file
    /// - Connection refused, non-2xx status
    #[error("Failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// The source did not answer within the probe timeout.
    #[error("Timed out fetching {0}")]
    Timeout(String),

    /// Bytes were fetched but are not a decodable image.
    #[error("Not a decodable image: {0}")]
    Decode(String),
}

impl MediaError {
    pub fn fetch(path: impl Into<String>, reason: impl ToString) -> Self {
        MediaError::Fetch {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
