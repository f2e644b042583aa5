//! In-memory image source for tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::error::{MediaError, MediaResult};
use crate::source::ImageSource;

/// A 2x2 PNG.
pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode test png");
    buffer.into_inner()
}

/// Serves fixed files and counts fetches.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageSource for MemorySource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, MediaResult<Vec<u8>>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| MediaError::NotFound(path.to_string()))
        }
        .boxed()
    }

    fn locate(&self, path: &str) -> String {
        format!("mem://{path}")
    }
}
