//! # Image Sources
//!
//! Where image bytes come from. The image root in the configuration picks
//! the implementation:
//!
//! ```text
//! root = "/srv/catalog"             ──► FsSource    (tokio::fs)
//! root = "https://cdn.example/cat/" ──► HttpSource  (reqwest)
//! ```

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::StatusCode;
use url::Url;

use crate::error::{MediaError, MediaResult};

/// A place image files can be read from.
pub trait ImageSource: Send + Sync + Debug {
    /// Reads the file at `path` (relative, `/`-separated).
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, MediaResult<Vec<u8>>>;

    /// Full location of `path`, for display and for cart lines.
    fn locate(&self, path: &str) -> String;
}

/// Builds the source for an image root.
pub fn open_source(root: &str, request_timeout: Duration) -> MediaResult<Arc<dyn ImageSource>> {
    let root = root.trim();
    if root.is_empty() {
        return Err(MediaError::InvalidRoot("empty".to_string()));
    }
    if root.starts_with("http://") || root.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(root, request_timeout)?))
    } else {
        Ok(Arc::new(FsSource::new(root)))
    }
}

// =============================================================================
// Local Directory
// =============================================================================

#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSource { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl ImageSource for FsSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, MediaResult<Vec<u8>>> {
        async move {
            tokio::fs::read(self.resolve(path)).await.map_err(|e| match e.kind() {
                ErrorKind::NotFound => MediaError::NotFound(path.to_string()),
                _ => MediaError::fetch(path, e),
            })
        }
        .boxed()
    }

    fn locate(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }
}

// =============================================================================
// HTTP Base URL
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: &str, request_timeout: Duration) -> MediaResult<Self> {
        // Url::join drops the last segment unless the base ends in '/'
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| MediaError::InvalidRoot(e.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(format!("partdeck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| MediaError::Client(e.to_string()))?;

        Ok(HttpSource { client, base })
    }

    fn url(&self, path: &str) -> MediaResult<Url> {
        self.base
            .join(path)
            .map_err(|e| MediaError::fetch(path, e))
    }
}

impl ImageSource for HttpSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, MediaResult<Vec<u8>>> {
        async move {
            let url = self.url(path)?;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| MediaError::fetch(path, e))?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(MediaError::NotFound(path.to_string()));
            }
            let response = response
                .error_for_status()
                .map_err(|e| MediaError::fetch(path, e))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| MediaError::fetch(path, e))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }

    fn locate(&self, path: &str) -> String {
        self.url(path)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{path}", self.base))
    }
}
