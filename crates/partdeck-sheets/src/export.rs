//! # Order List Export
//!
//! Writes the cart as an `.xlsx` order list.
//!
//! ## Sheet Layout
//! ```text
//! ┌─────┬─────────┬────────┬───────────┬────────┬────────┬────────┬─────┐
//! │ No. │ Image   │ Code   │ Orig code │ Name   │ Specs  │ Brand  │ Qty │  header, h=25
//! ├─────┼─────────┼────────┼───────────┼────────┼────────┼────────┼─────┤
//! │  1  │ [png]   │ X1     │ 0042      │ Widget │ 12V    │ Kelon  │  2  │  h=75 per line
//! │  2  │No image │ ...    │           │        │        │        │     │
//! ├─────┴─────────┴────────┴───────────┴────────┴────────┴────────┴─────┤
//! │                                                       (blank row)   │
//! │ Summary                                                             │  h=20
//! │ Item kinds      2                                                   │
//! │ Total quantity  5                                                   │
//! │ Export date     5/1/2024                                            │
//! │ Export time     2:05:09 PM                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Images are passed in already loaded; this module does no discovery.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Image, Workbook as XlsxWorkbook, Worksheet,
    XlsxError,
};
use tracing::{debug, info, warn};

use partdeck_core::{CartItem, Language};

use crate::error::{SheetsError, SheetsResult};

const COLUMN_WIDTHS: [f64; 8] = [8.0, 40.0, 20.0, 20.0, 30.0, 40.0, 15.0, 10.0];
const HEADER_HEIGHT: f64 = 25.0;
const LINE_HEIGHT: f64 = 75.0;
const SUMMARY_HEIGHT: f64 = 20.0;

const ACCENT: u32 = 0x3498DB;
const GRID: u32 = 0xDDDDDD;

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub line_count: usize,
    pub total_quantity: i64,
    pub images_embedded: usize,
}

/// An order list ready to be written.
#[derive(Debug, Clone)]
pub struct OrderList<'a> {
    items: &'a [CartItem],
    images: Vec<Option<Vec<u8>>>,
    language: Language,
    exported_at: NaiveDateTime,
}

struct Formats {
    header: Format,
    center: Format,
    left: Format,
    summary_title: Format,
    summary_label: Format,
    summary_value: Format,
}

impl Formats {
    fn new() -> Self {
        let grid = Format::new()
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(GRID));

        Formats {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(ACCENT))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::Black),
            center: grid.clone().set_align(FormatAlign::Center),
            left: grid.clone().set_align(FormatAlign::Left),
            summary_title: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_font_color(Color::RGB(ACCENT))
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(ACCENT)),
            summary_label: grid.clone().set_bold(),
            summary_value: grid,
        }
    }
}

impl<'a> OrderList<'a> {
    /// ## Errors
    /// - `EmptyCart` when there are no lines
    pub fn new(
        items: &'a [CartItem],
        language: Language,
        exported_at: NaiveDateTime,
    ) -> SheetsResult<Self> {
        if items.is_empty() {
            return Err(SheetsError::EmptyCart);
        }
        Ok(OrderList {
            items,
            images: Vec::new(),
            language,
            exported_at,
        })
    }

    /// Image bytes per line, in line order. Missing entries mean no image.
    pub fn with_images(mut self, images: Vec<Option<Vec<u8>>>) -> Self {
        self.images = images;
        self
    }

    /// `Order_List_2024-05-01.xlsx` / `订购清单_2024-05-01.xlsx`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.xlsx",
            self.language.text().order_file_prefix,
            self.exported_at.format("%Y-%m-%d")
        )
    }

    /// Writes the workbook into `dir` under [`Self::file_name`].
    pub fn save_in(&self, dir: &Path) -> SheetsResult<ExportSummary> {
        std::fs::create_dir_all(dir).map_err(|e| SheetsError::io(dir, e))?;
        self.save(&dir.join(self.file_name()))
    }

    /// Writes the workbook to `path`. A failed save removes any partial file.
    pub fn save(&self, path: &Path) -> SheetsResult<ExportSummary> {
        let mut workbook = XlsxWorkbook::new();
        let images_embedded = self
            .fill(&mut workbook)
            .map_err(|e| SheetsError::write(path, e))?;

        if let Err(e) = workbook.save(path) {
            if path.exists() {
                let _ = std::fs::remove_file(path);
            }
            return Err(SheetsError::write(path, e));
        }

        let summary = ExportSummary {
            path: path.to_path_buf(),
            line_count: self.items.len(),
            total_quantity: self.items.iter().map(|i| i.quantity).sum(),
            images_embedded,
        };
        info!(
            path = %path.display(),
            lines = summary.line_count,
            images = images_embedded,
            "Order list exported"
        );
        Ok(summary)
    }

    fn fill(&self, workbook: &mut XlsxWorkbook) -> Result<usize, XlsxError> {
        let text = self.language.text();
        let formats = Formats::new();
        let worksheet = workbook.add_worksheet().set_name(text.order_list)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        let headers = [
            text.col_serial,
            text.col_image,
            text.col_code,
            text.col_original_code,
            text.col_name,
            text.col_specs,
            text.col_brand,
            text.col_quantity,
        ];
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
        }
        worksheet.set_row_height(0, HEADER_HEIGHT)?;

        let mut embedded = 0;
        for (i, item) in self.items.iter().enumerate() {
            let row = (i + 1) as u32;
            self.write_line(worksheet, row, i, item, &formats)?;
            let image = self.images.get(i).and_then(Option::as_deref);
            if self.write_image(worksheet, row, item, image, &formats)? {
                embedded += 1;
            }
        }

        self.write_summary(worksheet, (self.items.len() + 2) as u32, &formats)?;
        Ok(embedded)
    }

    fn write_line(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        index: usize,
        item: &CartItem,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let brand = if item.selected_brand.is_empty() {
            self.language.text().no_brand
        } else {
            item.selected_brand.as_str()
        };

        worksheet.set_row_height(row, LINE_HEIGHT)?;
        worksheet.write_number_with_format(row, 0, (index + 1) as f64, &formats.center)?;
        worksheet.write_string_with_format(row, 2, &item.code, &formats.left)?;
        worksheet.write_string_with_format(row, 3, &item.original_code, &formats.left)?;
        worksheet.write_string_with_format(row, 4, &item.name, &formats.left)?;
        worksheet.write_string_with_format(row, 5, &item.specs, &formats.left)?;
        worksheet.write_string_with_format(row, 6, brand, &formats.left)?;
        worksheet.write_number_with_format(row, 7, item.quantity as f64, &formats.center)?;
        Ok(())
    }

    /// Embeds the image or writes the "no image" text. Returns true if embedded.
    fn write_image(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        item: &CartItem,
        bytes: Option<&[u8]>,
        formats: &Formats,
    ) -> Result<bool, XlsxError> {
        if let Some(bytes) = bytes {
            match Image::new_from_buffer(bytes) {
                Ok(image) => {
                    worksheet.write_blank(row, 1, &formats.center)?;
                    worksheet.insert_image_fit_to_cell(row, 1, &image, false)?;
                    debug!(code = %item.code, "Image embedded");
                    return Ok(true);
                }
                Err(e) => warn!(code = %item.code, error = %e, "Image not embeddable"),
            }
        }
        worksheet.write_string_with_format(row, 1, self.language.text().no_image, &formats.center)?;
        Ok(false)
    }

    fn write_summary(
        &self,
        worksheet: &mut Worksheet,
        start: u32,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let text = self.language.text();
        let (date, time) = match self.language {
            Language::ZhCn => ("%Y/%-m/%-d", "%H:%M:%S"),
            Language::EnUs => ("%-m/%-d/%Y", "%-I:%M:%S %p"),
        };
        let total_quantity: i64 = self.items.iter().map(|i| i.quantity).sum();

        worksheet.write_string_with_format(start, 0, text.summary, &formats.summary_title)?;
        worksheet.write_string_with_format(start + 1, 0, text.item_kinds, &formats.summary_label)?;
        worksheet.write_number_with_format(
            start + 1,
            1,
            self.items.len() as f64,
            &formats.summary_value,
        )?;
        worksheet.write_string_with_format(start + 2, 0, text.total_quantity, &formats.summary_label)?;
        worksheet.write_number_with_format(start + 2, 1, total_quantity as f64, &formats.summary_value)?;
        worksheet.write_string_with_format(start + 3, 0, text.export_date, &formats.summary_label)?;
        worksheet.write_string_with_format(
            start + 3,
            1,
            self.exported_at.format(date).to_string(),
            &formats.summary_value,
        )?;
        worksheet.write_string_with_format(start + 4, 0, text.export_time, &formats.summary_label)?;
        worksheet.write_string_with_format(
            start + 4,
            1,
            self.exported_at.format(time).to_string(),
            &formats.summary_value,
        )?;

        for row in start..=start + 4 {
            worksheet.set_row_height(row, SUMMARY_HEIGHT)?;
        }
        Ok(())
    }
}
