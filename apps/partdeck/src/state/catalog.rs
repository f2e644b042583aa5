//! # Catalog State
//!
//! Owns the browsing [`ViewController`] and (re)loads the product index
//! from the catalog JSON file.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load() / reload()                                                      │
//! │       │                                                                 │
//! │       ├── tracker.begin("catalog") ──► ticket                           │
//! │       ├── view.begin_load()            (pagination.is_loading = true)   │
//! │       ├── tokio::fs::read_to_string(products_data.json)                 │
//! │       ├── spawn_blocking(CatalogIndex::from_json_str)                   │
//! │       │                                                                 │
//! │       ├── ticket stale? ──► Superseded (a newer load owns the view)     │
//! │       ├── Ok  ──► view.load(index) / view.reload(index)                 │
//! │       └── Err ──► view.fail_load(message), previous index kept          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use partdeck_core::{CatalogIndex, ViewController};
use partdeck_media::LoadTracker;

use crate::error::ApiError;
use crate::state::MediaState;

/// Result of a catalog load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadOutcome {
    Loaded { sheets: usize, products: usize },
    /// A newer load started before this one finished.
    Superseded,
}

pub struct CatalogState {
    source: PathBuf,
    view: Mutex<ViewController>,
    loads: LoadTracker,
}

#[derive(Clone, Copy)]
enum LoadMode {
    Initial,
    Refresh,
}

impl CatalogState {
    pub fn new(source: impl Into<PathBuf>, items_per_page: usize) -> Self {
        CatalogState {
            source: source.into(),
            view: Mutex::new(ViewController::new(items_per_page)),
            loads: LoadTracker::new(),
        }
    }

    pub fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ViewController) -> R,
    {
        let view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }

    pub fn with_view_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ViewController) -> R,
    {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }

    pub fn is_loaded(&self) -> bool {
        self.with_view(|view| view.index().is_some())
    }

    /// Loads the catalog for the first time.
    pub async fn load(&self) -> Result<LoadOutcome, ApiError> {
        self.load_with(LoadMode::Initial).await
    }

    /// Loads the catalog unless it already is.
    pub async fn ensure_loaded(&self) -> Result<(), ApiError> {
        if !self.is_loaded() {
            self.load().await?;
        }
        Ok(())
    }

    /// Rebuilds the index from disk and clears the image cache.
    ///
    /// The view returns to the first sheet with search cleared.
    pub async fn reload(&self, media: &MediaState) -> Result<LoadOutcome, ApiError> {
        media.clear_cache();
        self.load_with(LoadMode::Refresh).await
    }

    async fn load_with(&self, mode: LoadMode) -> Result<LoadOutcome, ApiError> {
        let ticket = self.loads.begin("catalog");
        self.with_view_mut(|view| view.begin_load());

        let result = read_index(&self.source).await;

        if !self.loads.is_current(&ticket) {
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(index) => {
                let outcome = LoadOutcome::Loaded {
                    sheets: index.sheet_count(),
                    products: index.len(),
                };
                self.with_view_mut(|view| match mode {
                    LoadMode::Initial => view.load(index),
                    LoadMode::Refresh => view.reload(index),
                });
                info!(source = %self.source.display(), ?outcome, "Catalog loaded");
                Ok(outcome)
            }
            Err(message) => {
                warn!(source = %self.source.display(), error = %message, "Catalog load failed");
                self.with_view_mut(|view| view.fail_load(message.clone()));
                Err(ApiError::catalog(message))
            }
        }
    }
}

async fn read_index(path: &Path) -> Result<CatalogIndex, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    tokio::task::spawn_blocking(move || CatalogIndex::from_json_str(&text))
        .await
        .map_err(|e| format!("Catalog parse task failed: {}", e))?
        .map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};

    pub const CATALOG_JSON: &str = r#"{
        "Pumps": [
            { "CODE": "P-1", "MODEL": "Water pump", "SPECS": "12V", "PRICE": "19.90", "BRAND": "Acme" },
            { "CODE": "P-2", "MODEL": "Oil pump", "FITS MACHINE": "T-800", "PRICE": 5 }
        ],
        "Valves": [
            { "CODE": "V-1", "NAME": "Check valve", "DESCRIPTION": "brass" }
        ],
        "Empty": []
    }"#;

    pub fn write_catalog(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("products_data.json");
        std::fs::write(&path, contents).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::state::media::testing::media_state;
    use partdeck_core::{Screen, ViewKind};

    #[tokio::test]
    async fn test_load_reads_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CatalogState::new(write_catalog(dir.path(), CATALOG_JSON), 12);

        let outcome = catalog.load().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { sheets: 3, products: 3 });
        assert!(catalog.is_loaded());
        assert!(!catalog.with_view(|v| v.is_loading()));
    }

    #[tokio::test]
    async fn test_missing_file_shows_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CatalogState::new(dir.path().join("missing.json"), 12);

        let err = catalog.load().await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CatalogError);
        catalog.with_view(|v| assert!(matches!(v.render(), Screen::LoadError { .. })));
    }

    #[tokio::test]
    async fn test_reload_keeps_index_on_failure_and_resets_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path(), CATALOG_JSON);
        let catalog = CatalogState::new(&path, 12);
        let media = media_state(dir.path());
        catalog.load().await.unwrap();
        catalog.with_view_mut(|v| v.search("pump").unwrap());

        std::fs::write(&path, "not json").unwrap();
        assert!(catalog.reload(&media).await.is_err());
        assert!(catalog.with_view(|v| v.index().is_some()));

        std::fs::write(&path, CATALOG_JSON).unwrap();
        catalog.reload(&media).await.unwrap();
        catalog.with_view(|v| {
            assert!(!v.is_search_mode());
            assert_eq!(v.selected_sheet(), Some("Pumps"));
            assert_eq!(v.view(), Some(ViewKind::Products));
        });
    }

    #[tokio::test]
    async fn test_overlapping_loads_older_is_superseded() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CatalogState::new(write_catalog(dir.path(), CATALOG_JSON), 12);
        let media = media_state(dir.path());

        // The first load is parked on the file read when the second begins
        let (first, second) = tokio::join!(catalog.load(), catalog.reload(&media));

        assert_eq!(first.unwrap(), LoadOutcome::Superseded);
        assert_eq!(
            second.unwrap(),
            LoadOutcome::Loaded { sheets: 3, products: 3 }
        );
        assert!(catalog.is_loaded());
        assert!(!catalog.with_view(|v| v.is_loading()));
    }
}
