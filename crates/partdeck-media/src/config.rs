//! # Image Settings
//!
//! The `[images]` section of the catalog configuration.
//!
//! ```toml
//! [images]
//! root = "/srv/catalog"          # directory or http(s) base URL
//! probe_timeout_ms = 3000
//! primary_ttl_secs = 10
//! variant_ttl_secs = 30
//! max_variants = 8
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use partdeck_core::MAX_VARIANT_IMAGES;

use crate::error::{MediaError, MediaResult};
use crate::source::{open_source, ImageSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Directory holding `images/` and `Moreimages/`, or a base URL.
    #[serde(default = "default_root")]
    pub root: String,

    /// Per-probe budget for fetching one candidate.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// How long a primary-image result (hit or miss) stays fresh.
    #[serde(default = "default_primary_ttl_secs")]
    pub primary_ttl_secs: u64,

    /// How long a gallery result stays fresh.
    #[serde(default = "default_variant_ttl_secs")]
    pub variant_ttl_secs: u64,

    /// Highest gallery slot probed.
    #[serde(default = "default_max_variants")]
    pub max_variants: u32,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_primary_ttl_secs() -> u64 {
    10
}

fn default_variant_ttl_secs() -> u64 {
    30
}

fn default_max_variants() -> u32 {
    MAX_VARIANT_IMAGES
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            root: default_root(),
            probe_timeout_ms: default_probe_timeout_ms(),
            primary_ttl_secs: default_primary_ttl_secs(),
            variant_ttl_secs: default_variant_ttl_secs(),
            max_variants: default_max_variants(),
        }
    }
}

impl ImageSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn primary_ttl(&self) -> Duration {
        Duration::from_secs(self.primary_ttl_secs)
    }

    pub fn variant_ttl(&self) -> Duration {
        Duration::from_secs(self.variant_ttl_secs)
    }

    /// Builds the source named by `root`.
    pub fn open_source(&self) -> MediaResult<Arc<dyn ImageSource>> {
        open_source(&self.root, self.probe_timeout())
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.root.trim().is_empty() {
            return Err(MediaError::InvalidRoot("images.root must not be empty".to_string()));
        }
        if self.probe_timeout_ms == 0 {
            return Err(MediaError::InvalidRoot(
                "images.probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_variants > MAX_VARIANT_IMAGES {
            return Err(MediaError::InvalidRoot(format!(
                "images.max_variants must be at most {MAX_VARIANT_IMAGES}"
            )));
        }
        Ok(())
    }
}
