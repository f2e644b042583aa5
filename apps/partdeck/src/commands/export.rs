//! # Export Command
//!
//! Writes the cart as an `.xlsx` order list.
//!
//! ```text
//! cart lines ──► load_primary() per line (concurrent) ──► spawn_blocking
//!                                                          OrderList::save
//! ```

use std::path::PathBuf;

use chrono::Local;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::debug;

use partdeck_core::Language;
use partdeck_sheets::{ExportSummary, OrderList, SheetsError};

use crate::config::ExportSettings;
use crate::error::ApiError;
use crate::state::{CartState, MediaState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDto {
    pub path: PathBuf,
    pub line_count: usize,
    pub total_quantity: i64,
    pub images_embedded: usize,
}

impl From<ExportSummary> for ExportDto {
    fn from(summary: ExportSummary) -> Self {
        ExportDto {
            path: summary.path,
            line_count: summary.line_count,
            total_quantity: summary.total_quantity,
            images_embedded: summary.images_embedded,
        }
    }
}

/// Exports the cart.
///
/// ## Arguments
/// * `out` - Target file, or a directory for the default file name.
///   Defaults to `export.dir`.
///
/// ## Errors
/// - `CartError` if the cart is empty
/// - `SpreadsheetError` if the workbook cannot be written
pub async fn export_order_list(
    cart: &CartState,
    media: &MediaState,
    settings: &ExportSettings,
    language: Language,
    out: Option<PathBuf>,
) -> Result<ExportDto, ApiError> {
    let lines = cart.with_cart(|c| c.lines().to_vec());
    if lines.is_empty() {
        return Err(SheetsError::EmptyCart.into());
    }

    let images = if settings.embed_images {
        let discovery = media.discovery();
        join_all(lines.iter().map(|line| discovery.load_primary(&line.code))).await
    } else {
        Vec::new()
    };

    let target = out.unwrap_or_else(|| settings.dir.clone());
    debug!(target = %target.display(), lines = lines.len(), "Exporting order list");
    let exported_at = Local::now().naive_local();

    let summary = tokio::task::spawn_blocking(move || {
        let list = OrderList::new(&lines, language, exported_at)?.with_images(images);
        if target.is_dir() || target.extension().is_none() {
            list.save_in(&target)
        } else {
            list.save(&target)
        }
    })
    .await
    .map_err(|e| ApiError::internal(format!("Export task failed: {}", e)))??;

    Ok(summary.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::media::testing::{media_state, write_primary};
    use crate::state::CatalogState;
    use crate::state::catalog::testing::{write_catalog, CATALOG_JSON};
    use partdeck_store::{Database, StoreConfig};

    #[tokio::test]
    async fn test_export_embeds_images() {
        let dir = tempfile::tempdir().unwrap();
        write_primary(dir.path(), "P-1");
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        let catalog = CatalogState::new(write_catalog(dir.path(), CATALOG_JSON), 12);
        let cart = CartState::load(db.cart()).await.unwrap();
        let media = media_state(dir.path());
        let settings = ExportSettings {
            dir: dir.path().join("orders"),
            embed_images: true,
        };

        let err = export_order_list(&cart, &media, &settings, Language::EnUs, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CartError);

        for code in ["P-1", "V-1"] {
            crate::commands::cart::add_to_cart(&catalog, &cart, &media, code, 2, None, Language::EnUs)
                .await
                .unwrap();
        }

        let dto = export_order_list(&cart, &media, &settings, Language::EnUs, None)
            .await
            .unwrap();
        assert!(dto.path.starts_with(dir.path().join("orders")));
        assert!(dto.path.exists());
        assert_eq!(dto.line_count, 2);
        assert_eq!(dto.total_quantity, 4);
        assert_eq!(dto.images_embedded, 1);

        let file = dir.path().join("mine.xlsx");
        let dto = export_order_list(&cart, &media, &settings, Language::ZhCn, Some(file.clone()))
            .await
            .unwrap();
        assert_eq!(dto.path, file);
    }
}
