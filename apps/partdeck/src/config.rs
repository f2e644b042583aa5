//! # Catalog Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARTDECK_CATALOG_PATH=/srv/catalog/products_data.json              │
//! │     PARTDECK_LANGUAGE=zh-CN                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/catalog/catalog.toml (Linux)                             │
//! │     ~/Library/Application Support/com.partdeck.catalog/catalog.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [data]
//! catalog_path = "products_data.json"
//! items_per_page = 12
//!
//! [images]
//! root = "."                      # or "https://cdn.example.com/catalog/"
//! probe_timeout_ms = 3000
//!
//! [storage]
//! db_path = "/var/lib/partdeck/partdeck.db"
//!
//! [gate]
//! enabled = true
//! default_code = "PD2024"
//! remote_url = "https://example.com/partdeck_code.json"
//!
//! [export]
//! dir = "exports"
//!
//! [ui]
//! language = "zh-CN"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use partdeck_core::gate::GatePolicy;
use partdeck_core::{Language, ITEMS_PER_PAGE, MIN_CODE_LENGTH};
use partdeck_media::ImageSettings;

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "catalog.toml";
const DB_FILE: &str = "partdeck.db";

// =============================================================================
// Sections
// =============================================================================

/// Where the catalog comes from and how it is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Catalog JSON document.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Products per listing page.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("products_data.json")
}

fn default_items_per_page() -> usize {
    ITEMS_PER_PAGE
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            catalog_path: default_catalog_path(),
            items_per_page: default_items_per_page(),
        }
    }
}

/// Local store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Verification gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSettings {
    /// Require a verification code before browsing.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Code used when no remote or locally stored code exists.
    #[serde(default = "default_code")]
    pub default_code: String,

    /// Endpoint returning `{"code": "..."}`.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// How long a fetched remote code is trusted without refetching.
    #[serde(default = "default_remote_cache_secs")]
    pub remote_cache_secs: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

fn default_true() -> bool {
    true
}

fn default_code() -> String {
    "PD2024".to_string()
}

fn default_remote_cache_secs() -> u64 {
    120
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_lockout_secs() -> u64 {
    300
}

fn default_token_ttl_hours() -> u64 {
    24
}

impl Default for GateSettings {
    fn default() -> Self {
        GateSettings {
            enabled: default_true(),
            default_code: default_code(),
            remote_url: None,
            remote_cache_secs: default_remote_cache_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
            lockout_secs: default_lockout_secs(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl GateSettings {
    pub fn policy(&self) -> GatePolicy {
        GatePolicy {
            max_attempts: self.max_attempts,
            lockout: chrono::Duration::seconds(self.lockout_secs as i64),
            token_ttl: chrono::Duration::hours(self.token_ttl_hours as i64),
        }
    }

    pub fn remote_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.remote_cache_secs as i64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Order list export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory order lists are written to.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,

    /// Embed primary images in the image column.
    #[serde(default = "default_true")]
    pub embed_images: bool,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            dir: default_export_dir(),
            embed_images: true,
        }
    }
}

/// Presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Language used until the user picks one.
    #[serde(default)]
    pub language: Language,
}

// =============================================================================
// Catalog Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub data: DataSettings,

    #[serde(default)]
    pub images: ImageSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub gate: GateSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

impl CatalogConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`catalog.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading catalog config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), "Catalog config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.data.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data.catalog_path must not be empty".into()));
        }

        if self.data.items_per_page == 0 {
            return Err(ConfigError::Invalid(
                "data.items_per_page must be greater than 0".into(),
            ));
        }

        self.images
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.gate.default_code.trim().chars().count() < MIN_CODE_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "gate.default_code must be at least {} characters",
                MIN_CODE_LENGTH
            )));
        }

        if let Some(ref url) = self.gate.remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "gate.remote_url must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.gate.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "gate.max_attempts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `PARTDECK_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PARTDECK_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.data.catalog_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("PARTDECK_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(path));
        }

        if let Some(root) = lookup("PARTDECK_IMAGE_ROOT") {
            debug!(root = %root, "Overriding image root from environment");
            self.images.root = root;
        }

        if let Some(language) = lookup("PARTDECK_LANGUAGE") {
            match language.parse() {
                Ok(parsed) => self.ui.language = parsed,
                Err(_) => warn!(language = %language, "Unknown language in environment"),
            }
        }

        if let Some(enabled) = lookup("PARTDECK_GATE_ENABLED") {
            match enabled.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.gate.enabled = true,
                "0" | "false" | "no" | "off" => self.gate.enabled = false,
                _ => warn!(value = %enabled, "Unknown PARTDECK_GATE_ENABLED value"),
            }
        }

        if let Some(url) = lookup("PARTDECK_GATE_REMOTE_URL") {
            self.gate.remote_url = Some(url).filter(|u| !u.trim().is_empty());
        }

        if let Some(dir) = lookup("PARTDECK_EXPORT_DIR") {
            self.export.dir = PathBuf::from(dir);
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "partdeck", "catalog")
    }

    /// `catalog.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Configured store file, or `partdeck.db` in the platform data directory.
    pub fn db_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.db_path {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DB_FILE))
            .ok_or_else(|| ConfigError::Invalid("Could not determine app data directory".into()))
    }
}
