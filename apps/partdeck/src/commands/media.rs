//! # Image Command
//!
//! Lists the images found for a product code.

use serde::Serialize;

use crate::error::ApiError;
use crate::state::MediaState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesDto {
    pub code: String,
    /// Primary image first, then gallery images in slot order.
    pub images: Vec<String>,
}

pub async fn product_images(media: &MediaState, code: &str) -> Result<ImagesDto, ApiError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ApiError::validation("Product code is required"));
    }
    let images = media.gallery(code).await.unwrap_or_default();
    Ok(ImagesDto {
        code: code.to_string(),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::media::testing::{media_state, png_bytes, write_primary};

    #[tokio::test]
    async fn test_gallery_order() {
        let dir = tempfile::tempdir().unwrap();
        write_primary(dir.path(), "X1");
        let more = dir.path().join("Moreimages");
        std::fs::create_dir_all(&more).unwrap();
        std::fs::write(more.join("X1(1).jpeg"), png_bytes()).unwrap();
        std::fs::write(more.join("X1(2).png"), png_bytes()).unwrap();
        std::fs::write(more.join("X1(4).png"), png_bytes()).unwrap();
        let media = media_state(dir.path());

        let dto = product_images(&media, " X1 ").await.unwrap();
        assert_eq!(dto.images.len(), 3);
        assert!(dto.images[0].ends_with("X1.png"));
        assert!(dto.images[1].ends_with("X1(1).jpeg"));
        assert!(dto.images[2].ends_with("X1(2).png"));

        assert!(product_images(&media, "  ").await.is_err());
    }
}
