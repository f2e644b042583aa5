//! # Import Command
//!
//! Converts a catalog workbook into the catalog JSON the browser loads.

use std::path::PathBuf;

use serde::Serialize;

use partdeck_sheets::import_catalog;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetCountDto {
    pub name: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDto {
    pub output: PathBuf,
    pub sheets: Vec<SheetCountDto>,
    pub total_records: usize,
}

/// Reads every sheet of `workbook` and writes the JSON document to `output`.
///
/// ## Errors
/// - `SpreadsheetError` if the workbook cannot be read or the JSON written
pub async fn import_workbook(workbook: PathBuf, output: PathBuf) -> Result<ImportDto, ApiError> {
    tokio::task::spawn_blocking(move || {
        let imported = import_catalog(&workbook)?;
        imported.write_json(&output)?;
        Ok::<_, ApiError>(ImportDto {
            sheets: imported
                .sheets()
                .iter()
                .map(|s| SheetCountDto {
                    name: s.name.clone(),
                    records: s.records,
                })
                .collect(),
            total_records: imported.total_records(),
            output,
        })
    })
    .await
    .map_err(|e| ApiError::internal(format!("Import task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_workbook_is_spreadsheet_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_workbook(dir.path().join("none.xlsx"), dir.path().join("out.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::SpreadsheetError);
        assert!(!dir.path().join("out.json").exists());
    }
}
