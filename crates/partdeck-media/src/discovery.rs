//! # Image Discovery
//!
//! Cached, coalesced lookups of a product's primary image and gallery.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_primary(code) / find_variants(code)                               │
//! │       │                                                                 │
//! │       ├── cache hit, younger than TTL ──► return cached paths           │
//! │       │   (primary 10s, variants 30s; misses are cached too)            │
//! │       ▼                                                                 │
//! │  in-flight lookup for (kind, code)? ──► await the same Shared future    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  start lookup                                                           │
//! │    primary:  probe images/{code}.png                                    │
//! │    variants: for N in 1..=8                                             │
//! │                join_all(probe .jpg, .png, .jpeg)                        │
//! │                first success in that order wins                         │
//! │                no success for N ──► stop                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store in cache, drop in-flight entry                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Results are paths relative to the image root. Use [`ImageDiscovery::locate`]
//! for a displayable location.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture, Shared};
use futures_util::FutureExt;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ImageSettings;
use crate::error::MediaResult;
use crate::paths::{primary_path, variant_candidates};
use crate::probe::{load_image, probe};
use crate::source::ImageSource;

/// Which lookup a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Primary,
    Variants,
}

type CacheKey = (ImageKind, String);
type Lookup = Shared<BoxFuture<'static, Vec<String>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    paths: Vec<String>,
    stored_at: Instant,
}

#[derive(Default)]
struct State {
    cache: HashMap<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, (u64, Lookup)>,
    next_lookup: u64,
    epoch: u64,
}

/// Probe timing and limits, copied out of [`ImageSettings`].
#[derive(Debug, Clone, Copy)]
struct Limits {
    probe_timeout: Duration,
    primary_ttl: Duration,
    variant_ttl: Duration,
    max_variants: u32,
}

/// Image lookups for one image root.
pub struct ImageDiscovery {
    source: Arc<dyn ImageSource>,
    limits: Limits,
    state: Mutex<State>,
}

impl std::fmt::Debug for ImageDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDiscovery")
            .field("source", &self.source)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl ImageDiscovery {
    pub fn new(source: Arc<dyn ImageSource>, settings: &ImageSettings) -> Self {
        ImageDiscovery {
            source,
            limits: Limits {
                probe_timeout: settings.probe_timeout(),
                primary_ttl: settings.primary_ttl(),
                variant_ttl: settings.variant_ttl(),
                max_variants: settings.max_variants,
            },
            state: Mutex::new(State::default()),
        }
    }

    /// Opens the source named by `settings.root`.
    pub fn from_settings(settings: &ImageSettings) -> MediaResult<Self> {
        Ok(Self::new(settings.open_source()?, settings))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Path of the primary image, if one exists.
    pub async fn find_primary(&self, code: &str) -> Option<String> {
        self.lookup(ImageKind::Primary, code).await.into_iter().next()
    }

    /// Gallery paths in slot order, stopping at the first empty slot.
    pub async fn find_variants(&self, code: &str) -> Vec<String> {
        self.lookup(ImageKind::Variants, code).await
    }

    /// Primary image (if any) followed by the gallery, for a detail view.
    pub async fn find_gallery(&self, code: &str) -> Vec<String> {
        let (primary, variants) =
            tokio::join!(self.find_primary(code), self.find_variants(code));
        primary.into_iter().chain(variants).collect()
    }

    /// Primary image from the cache only. `None` when nothing fresh is cached,
    /// `Some(None)` for a cached miss.
    pub fn cached_primary(&self, code: &str) -> Option<Option<String>> {
        let key = (ImageKind::Primary, code.to_string());
        let state = self.state();
        state
            .cache
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.limits.primary_ttl)
            .map(|entry| entry.paths.first().cloned())
    }

    /// Bytes of the primary image, for embedding.
    pub async fn load_primary(&self, code: &str) -> Option<Vec<u8>> {
        let path = self.find_primary(code).await?;
        load_image(self.source.as_ref(), &path, self.limits.probe_timeout)
            .await
            .ok()
    }

    /// Displayable location of a discovered path.
    pub fn locate(&self, path: &str) -> String {
        self.source.locate(path)
    }

    /// Forgets every cached result. Lookups already running finish but are
    /// not cached.
    pub fn clear_cache(&self) {
        let mut state = self.state();
        state.cache.clear();
        state.in_flight.clear();
        state.epoch += 1;
        debug!("Image cache cleared");
    }

    async fn lookup(&self, kind: ImageKind, code: &str) -> Vec<String> {
        let key = (kind, code.to_string());
        let ttl = match kind {
            ImageKind::Primary => self.limits.primary_ttl,
            ImageKind::Variants => self.limits.variant_ttl,
        };

        let (id, epoch, shared) = {
            let mut state = self.state();
            if let Some(entry) = state.cache.get(&key) {
                if entry.stored_at.elapsed() < ttl {
                    return entry.paths.clone();
                }
            }
            let epoch = state.epoch;
            let running = state
                .in_flight
                .get(&key)
                .map(|(id, shared)| (*id, shared.clone()));
            match running {
                Some((id, shared)) => (id, epoch, shared),
                None => {
                    state.next_lookup += 1;
                    let id = state.next_lookup;
                    let shared = self.start(kind, code);
                    state.in_flight.insert(key.clone(), (id, shared.clone()));
                    (id, epoch, shared)
                }
            }
        };

        let paths = shared.await;

        let mut state = self.state();
        if state.in_flight.get(&key).is_some_and(|(current, _)| *current == id) {
            state.in_flight.remove(&key);
        }
        if state.epoch == epoch {
            state.cache.insert(
                key,
                CacheEntry {
                    paths: paths.clone(),
                    stored_at: Instant::now(),
                },
            );
        }
        paths
    }

    fn start(&self, kind: ImageKind, code: &str) -> Lookup {
        let source = Arc::clone(&self.source);
        let code = code.to_string();
        let limits = self.limits;
        async move {
            match kind {
                ImageKind::Primary => scan_primary(source.as_ref(), &code, limits).await,
                ImageKind::Variants => scan_variants(source.as_ref(), &code, limits).await,
            }
        }
        .boxed()
        .shared()
    }
}

async fn scan_primary(source: &dyn ImageSource, code: &str, limits: Limits) -> Vec<String> {
    let path = primary_path(code);
    if probe(source, &path, limits.probe_timeout).await {
        debug!(code = %code, "Primary image found");
        vec![path]
    } else {
        Vec::new()
    }
}

async fn scan_variants(source: &dyn ImageSource, code: &str, limits: Limits) -> Vec<String> {
    let mut found = Vec::new();
    for index in 1..=limits.max_variants {
        let candidates = variant_candidates(code, index);
        let results = join_all(
            candidates
                .iter()
                .map(|path| probe(source, path, limits.probe_timeout)),
        )
        .await;

        match candidates.into_iter().zip(results).find(|(_, ok)| *ok) {
            Some((path, _)) => found.push(path),
            None => break,
        }
    }
    debug!(code = %code, count = found.len(), "Gallery scanned");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, MemorySource};

    fn discovery(source: MemorySource) -> (Arc<MemorySource>, ImageDiscovery) {
        let source = Arc::new(source);
        let discovery = ImageDiscovery::new(source.clone(), &ImageSettings::default());
        (source, discovery)
    }

    #[tokio::test]
    async fn test_primary_found_and_cached() {
        let (source, discovery) = discovery(MemorySource::new().with("images/X1.png", png_bytes()));

        assert_eq!(discovery.find_primary("X1").await.as_deref(), Some("images/X1.png"));
        assert_eq!(discovery.find_primary("X1").await.as_deref(), Some("images/X1.png"));
        assert_eq!(source.calls(), 1);
        assert_eq!(
            discovery.cached_primary("X1"),
            Some(Some("images/X1.png".to_string()))
        );
        assert_eq!(discovery.cached_primary("Y1"), None);
    }

    #[tokio::test]
    async fn test_variants_stop_at_first_gap() {
        let (_, discovery) = discovery(
            MemorySource::new()
                .with("Moreimages/X1(1).png", png_bytes())
                .with("Moreimages/X1(1).jpeg", png_bytes())
                .with("Moreimages/X1(2).jpg", png_bytes())
                .with("Moreimages/X1(4).jpg", png_bytes()),
        );

        assert_eq!(
            discovery.find_variants("X1").await,
            vec!["Moreimages/X1(1).png", "Moreimages/X1(2).jpg"]
        );
    }

    #[tokio::test]
    async fn test_gallery_puts_primary_first() {
        let (_, discovery) = discovery(
            MemorySource::new()
                .with("images/X1.png", png_bytes())
                .with("Moreimages/X1(1).jpg", png_bytes()),
        );
        assert_eq!(
            discovery.find_gallery("X1").await,
            vec!["images/X1.png", "Moreimages/X1(1).jpg"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_probe() {
        let (source, discovery) = discovery(
            MemorySource::new()
                .with("images/X1.png", png_bytes())
                .with_delay(Duration::from_millis(50)),
        );

        let (a, b, c) = tokio::join!(
            discovery.find_primary("X1"),
            discovery.find_primary("X1"),
            discovery.find_primary("X1")
        );
        assert!(a.is_some() && b.is_some() && c.is_some());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_misses_expire_after_ttl() {
        let (source, discovery) = discovery(MemorySource::new());

        assert_eq!(discovery.find_primary("X1").await, None);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(discovery.find_primary("X1").await, None);
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(discovery.find_primary("X1").await, None);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_probe() {
        let (source, discovery) = discovery(MemorySource::new().with("images/X1.png", png_bytes()));

        discovery.find_primary("X1").await;
        discovery.clear_cache();
        discovery.find_primary("X1").await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_primary_returns_bytes() {
        let bytes = png_bytes();
        let (_, discovery) = discovery(MemorySource::new().with("images/X1.png", bytes.clone()));
        assert_eq!(discovery.load_primary("X1").await, Some(bytes));
        assert_eq!(discovery.load_primary("nope").await, None);
    }
}
