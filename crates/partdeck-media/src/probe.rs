//! # Image Probe
//!
//! A probe answers "is there a usable image at this path?". It fetches the
//! bytes within a timeout and decodes them off the async threads.
//!
//! ```text
//! fetch ── error / timeout ──► false
//!   │
//!   ▼
//! decode (spawn_blocking) ── not an image ──► false
//!   │
//!   ▼
//! true
//! ```

use std::time::Duration;

use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::source::ImageSource;

/// Fetches `path` and checks that the bytes decode as an image.
pub async fn load_image(
    source: &dyn ImageSource,
    path: &str,
    timeout: Duration,
) -> MediaResult<Vec<u8>> {
    let bytes = tokio::time::timeout(timeout, source.fetch(path))
        .await
        .map_err(|_| MediaError::Timeout(path.to_string()))??;

    let (bytes, decoded) = tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes).map(|_| ());
        (bytes, decoded)
    })
    .await
    .map_err(|e| MediaError::Decode(e.to_string()))?;

    decoded.map_err(|e| MediaError::Decode(e.to_string()))?;
    Ok(bytes)
}

/// True if `path` holds a decodable image. Failures are logged, never
/// returned.
pub async fn probe(source: &dyn ImageSource, path: &str, timeout: Duration) -> bool {
    match load_image(source, path, timeout).await {
        Ok(_) => true,
        Err(MediaError::NotFound(_)) => false,
        Err(e) => {
            debug!(path = %path, error = %e, "Image probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, MemorySource};

    #[tokio::test]
    async fn test_probe_outcomes() {
        let source = MemorySource::new()
            .with("images/ok.png", png_bytes())
            .with("images/junk.png", b"not an image".to_vec());
        let timeout = Duration::from_millis(500);

        assert!(probe(&source, "images/ok.png", timeout).await);
        assert!(!probe(&source, "images/junk.png", timeout).await);
        assert!(!probe(&source, "images/none.png", timeout).await);
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let source = MemorySource::new()
            .with("images/slow.png", png_bytes())
            .with_delay(Duration::from_millis(200));

        let result = load_image(&source, "images/slow.png", Duration::from_millis(20)).await;
        assert!(matches!(result, Err(MediaError::Timeout(_))));
    }
}
