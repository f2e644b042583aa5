//! # Catalog Import
//!
//! Converts a catalog workbook into the catalog JSON document that
//! `CatalogIndex` loads.
//!
//! ## Sheet Layout
//! ```text
//! row 1   (ignored, usually pictures / title)
//! row 2   column headers        blank header ──► "Column_{n}"
//! row 3+  one product per row   fully empty rows are dropped
//! ```
//!
//! ## Record Shape
//! ```text
//! { "CODE": "000042", "MODEL": "Widget", ..., "_excel_row": 3 }
//!
//!   CODE   numeric codes become text, zero padded to 6 digits
//!          missing codes become "{sheet}_{n:04}"
//!          a lowercase "code" column is renamed to CODE
//!   _excel_row   1-based row number in the workbook
//! ```
//!
//! Each sheet is read from A1 so row numbers match what a person sees in
//! a spreadsheet program.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{SheetsError, SheetsResult};

/// Row holding the column headers (0-based).
const HEADER_ROW: u32 = 1;
/// First product row (0-based).
const DATA_START_ROW: u32 = 2;
/// Width `CODE` values made only of digits are padded to.
const CODE_WIDTH: usize = 6;

/// Records extracted from one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReport {
    pub name: String,
    pub records: usize,
}

/// A converted workbook.
#[derive(Debug, Clone, Default)]
pub struct ImportedCatalog {
    document: Map<String, Value>,
    sheets: Vec<SheetReport>,
}

impl ImportedCatalog {
    /// The catalog document, keyed by sheet name in workbook order.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn into_document(self) -> Value {
        Value::Object(self.document)
    }

    pub fn sheets(&self) -> &[SheetReport] {
        &self.sheets
    }

    pub fn total_records(&self) -> usize {
        self.sheets.iter().map(|s| s.records).sum()
    }

    /// Writes the document as pretty-printed UTF-8 JSON.
    pub fn write_json(&self, path: &Path) -> SheetsResult<()> {
        let text = serde_json::to_string_pretty(&self.document)
            .map_err(|e| SheetsError::io(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SheetsError::io(parent, e))?;
        }
        std::fs::write(path, text).map_err(|e| SheetsError::io(path, e))?;
        info!(
            path = %path.display(),
            sheets = self.sheets.len(),
            records = self.total_records(),
            "Catalog JSON written"
        );
        Ok(())
    }
}

/// Reads every sheet of the workbook at `path`.
///
/// ## Errors
/// - `Read` when the file cannot be opened as a workbook or a sheet fails
/// - `NoSheets` when the workbook has no sheets
pub fn import_catalog(path: &Path) -> SheetsResult<ImportedCatalog> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SheetsError::read(path, e))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(SheetsError::NoSheets(path.to_path_buf()));
    }

    let mut catalog = ImportedCatalog::default();
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| SheetsError::read(path, format!("sheet '{sheet_name}': {e}")))?;

        let records = sheet_records(sheet_name, &range);
        debug!(sheet = %sheet_name, records = records.len(), "Sheet converted");

        catalog.sheets.push(SheetReport {
            name: sheet_name.clone(),
            records: records.len(),
        });
        catalog
            .document
            .insert(sheet_name.clone(), Value::Array(records));
    }

    info!(
        path = %path.display(),
        sheets = catalog.sheets.len(),
        records = catalog.total_records(),
        "Catalog workbook imported"
    );
    Ok(catalog)
}

/// Converts one sheet. Sheets shorter than three rows yield no records.
fn sheet_records(sheet_name: &str, range: &Range<Data>) -> Vec<Value> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };
    let height = end_row + 1;
    let width = end_col + 1;
    if height <= DATA_START_ROW {
        return Vec::new();
    }

    let headers: Vec<String> = (0..width)
        .map(|col| match cell_value(range.get_value((HEADER_ROW, col))) {
            Value::Null => format!("Column_{}", col + 1),
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();

    let mut records = Vec::new();
    for row in DATA_START_ROW..height {
        let values: Vec<Value> = (0..width)
            .map(|col| cell_value(range.get_value((row, col))))
            .collect();
        if values.iter().all(Value::is_null) {
            continue;
        }

        let mut record = Map::new();
        for (header, value) in headers.iter().zip(values) {
            let value = if header.eq_ignore_ascii_case("code") {
                code_text(value)
            } else {
                value
            };
            record.insert(header.clone(), value);
        }

        let n = (row - DATA_START_ROW + 1) as usize;
        normalize_code(&mut record, sheet_name, n);
        record.insert("_excel_row".to_string(), Value::from(row + 1));
        records.push(Value::Object(record));
    }
    records
}

/// JSON value of one cell. Text is trimmed; blank text counts as empty.
fn cell_value(cell: Option<&Data>) -> Value {
    match cell {
        None | Some(Data::Empty) => Value::Null,
        Some(Data::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Some(Data::Float(n)) => float_value(*n),
        Some(Data::Int(n)) => Value::from(*n),
        Some(Data::Bool(b)) => Value::Bool(*b),
        Some(Data::Error(e)) => Value::String(format!("#{:?}", e)),
        Some(Data::DateTime(dt)) => Value::String(serial_to_text(dt.as_f64())),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => Value::String(s.clone()),
    }
}

/// Integral floats become JSON integers.
fn float_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// `YYYY-MM-DD HH:MM:SS` for a 1900-system date serial.
fn serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    match epoch.checked_add_signed(Duration::milliseconds(millis)) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

/// Value of a code column as text: `42` and `"42.0"` both become `"42"`.
fn code_text(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::String((f as i64).to_string()),
            _ => Value::String(n.to_string()),
        },
        Value::String(s) => Value::String(strip_zero_fraction(&s).to_string()),
        other => other,
    }
}

/// `"123.00"` ──► `"123"`; anything else is returned unchanged.
fn strip_zero_fraction(text: &str) -> &str {
    match text.split_once('.') {
        Some((whole, fraction))
            if is_digits(whole) && !fraction.is_empty() && fraction.chars().all(|c| c == '0') =>
        {
            whole
        }
        _ => text,
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn pad_code(code: String) -> String {
    if is_digits(&code) && code.len() < CODE_WIDTH {
        format!("{code:0>width$}", width = CODE_WIDTH)
    } else {
        code
    }
}

fn code_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ensures the record has a text `CODE`, generating `{sheet}_{n:04}` when
/// the row has none.
fn normalize_code(record: &mut Map<String, Value>, sheet_name: &str, n: usize) {
    let generated = || Value::String(format!("{sheet_name}_{n:04}"));

    if let Some(value) = record.get("CODE") {
        let code = if value.is_null() {
            generated()
        } else {
            Value::String(pad_code(code_string(value)))
        };
        record.insert("CODE".to_string(), code);
    } else if let Some(value) = record.get("code") {
        if value.is_null() {
            record.insert("CODE".to_string(), generated());
        } else {
            let code = pad_code(code_string(value));
            record.remove("code");
            record.insert("CODE".to_string(), Value::String(code));
        }
    } else {
        record.insert("CODE".to_string(), generated());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;
    use serde_json::json;

    fn write_workbook(path: &Path) {
        let mut workbook = XlsxWorkbook::new();

        let pumps = workbook.add_worksheet().set_name("Pumps").unwrap();
        pumps.write_string(0, 0, "Catalog 2025").unwrap();
        pumps.write_string(1, 0, "CODE").unwrap();
        pumps.write_string(1, 1, " MODEL ").unwrap();
        pumps.write_string(1, 3, "PRICE").unwrap();
        // row 3: numeric code
        pumps.write_number(2, 0, 42.0).unwrap();
        pumps.write_string(2, 1, "  Water pump ").unwrap();
        pumps.write_number(2, 3, 12.5).unwrap();
        // row 4: blank, dropped
        // row 5: no code, integral float
        pumps.write_string(4, 1, "Oil pump").unwrap();
        pumps.write_number(4, 3, 30.0).unwrap();
        // row 6: text code
        pumps.write_string(5, 0, "0123.0").unwrap();
        pumps.write_string(5, 2, "extra").unwrap();
        pumps.write_boolean(5, 3, true).unwrap();

        let fans = workbook.add_worksheet().set_name("Fans").unwrap();
        fans.write_string(1, 0, "code").unwrap();
        fans.write_string(1, 1, "NAME").unwrap();
        fans.write_string(2, 0, "F-7").unwrap();
        fans.write_string(2, 1, "Ceiling fan").unwrap();
        fans.write_string(3, 1, "Desk fan").unwrap();

        let loose = workbook.add_worksheet().set_name("Loose").unwrap();
        loose.write_string(1, 0, "MODEL").unwrap();
        loose.write_string(2, 0, "Spare belt").unwrap();

        let short = workbook.add_worksheet().set_name("Short").unwrap();
        short.write_string(0, 0, "title").unwrap();
        short.write_string(1, 0, "CODE").unwrap();

        workbook.save(path).unwrap();
    }

    fn imported() -> ImportedCatalog {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xlsx");
        write_workbook(&path);
        import_catalog(&path).unwrap()
    }

    #[test]
    fn test_sheet_order_and_counts() {
        let catalog = imported();
        let names: Vec<&str> = catalog.sheets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Pumps", "Fans", "Loose", "Short"]);
        assert_eq!(catalog.sheets()[0].records, 3);
        assert_eq!(catalog.sheets()[3].records, 0);
        assert_eq!(catalog.total_records(), 6);
        assert_eq!(catalog.document()["Short"], json!([]));
    }

    #[test]
    fn test_uppercase_code_column() {
        let catalog = imported();
        let pumps = &catalog.document()["Pumps"];

        assert_eq!(
            pumps[0],
            json!({
                "CODE": "000042",
                "MODEL": "Water pump",
                "Column_3": null,
                "PRICE": 12.5,
                "_excel_row": 3
            })
        );
        assert_eq!(pumps[1]["CODE"], "Pumps_0003");
        assert_eq!(pumps[1]["PRICE"], 30);
        assert_eq!(pumps[1]["_excel_row"], 5);
        assert_eq!(pumps[2]["CODE"], "000123");
        assert_eq!(pumps[2]["Column_3"], "extra");
        assert_eq!(pumps[2]["PRICE"], true);
    }

    #[test]
    fn test_lowercase_code_column_is_renamed() {
        let catalog = imported();
        let fans = &catalog.document()["Fans"];

        assert_eq!(fans[0]["CODE"], "F-7");
        assert!(fans[0].get("code").is_none());
        assert_eq!(fans[1]["CODE"], "Fans_0002");
        assert_eq!(fans[1]["NAME"], "Desk fan");
    }

    #[test]
    fn test_missing_code_column_generates_codes() {
        let catalog = imported();
        assert_eq!(
            catalog.document()["Loose"],
            json!([{ "MODEL": "Spare belt", "CODE": "Loose_0001", "_excel_row": 3 }])
        );
    }

    #[test]
    fn test_write_json_loads_into_index() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = imported();
        let out = dir.path().join("out").join("products_data.json");
        catalog.write_json(&out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let index = partdeck_core::CatalogIndex::from_json_str(&text).unwrap();
        assert_eq!(index.len(), 6);
        assert!(index.find_by_code("000042").is_some());
    }

    #[test]
    fn test_unreadable_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        assert!(matches!(import_catalog(&path), Err(SheetsError::Read { .. })));
    }

    #[test]
    fn test_code_text_helpers() {
        assert_eq!(strip_zero_fraction("123.00"), "123");
        assert_eq!(strip_zero_fraction("12.5"), "12.5");
        assert_eq!(strip_zero_fraction("A.0"), "A.0");
        assert_eq!(pad_code("42".to_string()), "000042");
        assert_eq!(pad_code("1234567".to_string()), "1234567");
        assert_eq!(pad_code("X42".to_string()), "X42");
        assert_eq!(serial_to_text(45413.5), "2024-05-01 12:00:00");
    }
}
