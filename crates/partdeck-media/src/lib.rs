//! # partdeck-media: Asynchronous Image Discovery
//!
//! Product images are not listed in the catalog; they are found by probing
//! conventional paths under an image root (a directory or a base URL).
//!
//! ## Module Organization
//!
//! - [`paths`] - `images/{CODE}.png` and `Moreimages/{CODE}({N}){ext}`
//! - [`source`] - Local directory and HTTP image sources
//! - [`probe`] - Fetch-with-timeout plus decode check
//! - [`discovery`] - TTL cache and shared in-flight lookups
//! - [`generation`] - Stale-result suppression for async loads
//! - [`config`] - The `[images]` configuration section
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partdeck_media::{ImageDiscovery, ImageSettings};
//!
//! let discovery = ImageDiscovery::from_settings(&ImageSettings::default())?;
//! if let Some(path) = discovery.find_primary("X1").await {
//!     println!("{}", discovery.locate(&path));
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod discovery;
pub mod error;
pub mod generation;
pub mod paths;
pub mod probe;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ImageSettings;
pub use discovery::{ImageDiscovery, ImageKind};
pub use error::{MediaError, MediaResult};
pub use generation::{LoadTicket, LoadTracker};
pub use source::{open_source, FsSource, HttpSource, ImageSource};
