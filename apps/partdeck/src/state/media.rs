//! # Media State
//!
//! Shared image discovery plus a tracker that drops lookups whose subject
//! has moved on (the user opened another product before the gallery of the
//! previous one finished probing).

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use partdeck_media::{ImageDiscovery, ImageSettings, LoadTracker, MediaResult};

pub struct MediaState {
    discovery: Arc<ImageDiscovery>,
    loads: LoadTracker,
}

impl MediaState {
    pub fn new(discovery: ImageDiscovery) -> Self {
        MediaState {
            discovery: Arc::new(discovery),
            loads: LoadTracker::new(),
        }
    }

    pub fn from_settings(settings: &ImageSettings) -> MediaResult<Self> {
        Ok(Self::new(ImageDiscovery::from_settings(settings)?))
    }

    pub fn discovery(&self) -> &Arc<ImageDiscovery> {
        &self.discovery
    }

    /// Display path of the primary image, if there is one.
    pub async fn primary(&self, code: &str) -> Option<String> {
        let path = self.discovery.find_primary(code).await?;
        Some(self.discovery.locate(&path))
    }

    /// Primary image followed by numbered variants, as display paths.
    ///
    /// Returns `None` when a newer gallery request started while this one
    /// was probing.
    pub async fn gallery(&self, code: &str) -> Option<Vec<String>> {
        let ticket = self.loads.begin("gallery");
        let paths = self.discovery.find_gallery(code).await;

        if !self.loads.is_current(&ticket) {
            debug!(code, "Gallery result superseded");
            return None;
        }
        Some(paths.iter().map(|p| self.discovery.locate(p)).collect())
    }

    /// Primary images for a page of cards, probed concurrently.
    pub async fn card_images(&self, codes: &[String]) -> Option<Vec<Option<String>>> {
        let ticket = self.loads.begin("cards");
        let images = join_all(codes.iter().map(|code| self.primary(code))).await;

        if !self.loads.is_current(&ticket) {
            debug!(count = codes.len(), "Card images superseded");
            return None;
        }
        Some(images)
    }

    /// Drops cached lookups and invalidates running ones.
    pub fn clear_cache(&self) {
        self.discovery.clear_cache();
        self.loads.reset();
    }
}
