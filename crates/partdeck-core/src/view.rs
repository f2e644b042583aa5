//! # View Controller
//!
//! Owns the browsing state (loaded index, selected sheet, search, page) and
//! turns it into a [`Screen`] model for whichever front end renders it.
//!
//! ## View Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐  select_sheet   ┌────────────┐  show_detail  ┌────────┐  │
//! │   │  Sheets  │ ──────────────► │  Products  │ ────────────► │ Detail │  │
//! │   │ overview │ ◄────────────── │ sheet page │ ◄──────────── │        │  │
//! │   └──────────┘   show_sheets   │ or search  │  back_to_list └────────┘  │
//! │        ▲                       └────────────┘                           │
//! │        │    blank search, no sheet     ▲                                │
//! │        └───────────────────────────────┤ perform_search                 │
//! │                                        │                                │
//! │   load failure ──► LoadError (previous index kept)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::index::{CatalogIndex, SheetSummary};
use crate::pagination::Pagination;
use crate::product::{DetailField, Product};
use crate::search::search_positions;

/// Which screen owns the main content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Sheets,
    Products,
    Detail,
}

// =============================================================================
// Screen Model
// =============================================================================

/// Everything a renderer needs for the current view.
#[derive(Debug)]
pub enum Screen<'a> {
    /// Nothing loaded yet.
    Empty,
    /// The last load failed. A retry may succeed.
    LoadError { message: &'a str },
    Sheets(SheetsOverview),
    Listing(Listing<'a>),
    Detail(ProductDetail<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsOverview {
    pub sheet_count: usize,
    pub product_count: usize,
    pub sheets: Vec<SheetSummary>,
}

/// What a listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource<'a> {
    Sheet(&'a str),
    Search { term: &'a str },
}

/// One page of products.
#[derive(Debug)]
pub struct Listing<'a> {
    pub source: ListingSource<'a>,
    pub products: Vec<&'a Product>,
    pub pagination: &'a Pagination,
    pub page_window: RangeInclusive<usize>,
    pub showing: (usize, usize),
}

#[derive(Debug)]
pub struct ProductDetail<'a> {
    pub product: &'a Product,
    pub fields: Vec<DetailField>,
}

// =============================================================================
// Controller
// =============================================================================

/// Browsing state for one session.
#[derive(Debug, Default)]
pub struct ViewController {
    index: Option<CatalogIndex>,
    load_error: Option<String>,
    view: Option<ViewKind>,
    selected_sheet: Option<String>,
    selected_product: Option<usize>,
    search_term: String,
    search_results: Vec<usize>,
    search_mode: bool,
    pagination: Pagination,
}

impl ViewController {
    pub fn new(items_per_page: usize) -> Self {
        ViewController {
            pagination: Pagination::new(items_per_page),
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Marks a catalog load as running.
    pub fn begin_load(&mut self) {
        self.pagination.set_loading(true);
    }

    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    /// Installs a freshly built index and shows the sheets overview.
    pub fn load(&mut self, index: CatalogIndex) {
        self.index = Some(index);
        self.load_error = None;
        self.pagination.set_loading(false);
        self.show_sheets();
    }

    /// Replaces the index wholesale: first sheet selected, page 1, no search.
    pub fn reload(&mut self, index: CatalogIndex) {
        let first = index.first_sheet().map(|s| s.name().to_string());
        self.index = Some(index);
        self.load_error = None;
        self.pagination.set_loading(false);
        self.clear_search_state();
        self.selected_product = None;
        match first {
            Some(name) => {
                self.selected_sheet = Some(name);
                self.enter_listing(0);
                self.refresh_totals();
            }
            None => self.show_sheets(),
        }
    }

    /// Records a load failure. A previously loaded index stays available.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.load_error = Some(message.into());
        self.pagination.set_loading(false);
    }

    pub fn index(&self) -> Option<&CatalogIndex> {
        self.index.as_ref()
    }

    fn require_index(&self) -> CoreResult<&CatalogIndex> {
        self.index.as_ref().ok_or(CoreError::CatalogNotLoaded)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn show_sheets(&mut self) {
        self.clear_search_state();
        self.selected_sheet = None;
        self.selected_product = None;
        self.pagination.reset();
        self.pagination.set_total_items(0);
        self.view = Some(ViewKind::Sheets);
    }

    /// Shows page 1 of a sheet and leaves search mode.
    pub fn select_sheet(&mut self, name: &str) -> CoreResult<()> {
        let len = self
            .require_index()?
            .sheet(name)
            .map(<[Product]>::len)
            .ok_or_else(|| CoreError::SheetNotFound(name.to_string()))?;

        self.clear_search_state();
        self.selected_sheet = Some(name.to_string());
        self.selected_product = None;
        self.enter_listing(len);
        Ok(())
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Runs the stored search term.
    ///
    /// A blank term leaves search mode and falls back to the selected sheet,
    /// or to the sheets overview when no sheet is selected.
    ///
    /// ## Returns
    /// Number of matches (0 for a blank term).
    pub fn perform_search(&mut self) -> CoreResult<usize> {
        let results = search_positions(self.require_index()?, &self.search_term);

        if self.search_term.trim().is_empty() {
            self.clear_search();
            return Ok(0);
        }

        let count = results.len();
        self.search_results = results;
        self.search_mode = true;
        self.selected_product = None;
        self.enter_listing(count);
        Ok(count)
    }

    /// Sets the term and runs it.
    pub fn search(&mut self, term: &str) -> CoreResult<usize> {
        self.set_search_term(term);
        self.perform_search()
    }

    /// Leaves search mode and returns to the selected sheet or the overview.
    pub fn clear_search(&mut self) {
        self.clear_search_state();
        match self.selected_sheet.clone() {
            Some(sheet) if self.index.as_ref().and_then(|i| i.sheet(&sheet)).is_some() => {
                // Sheet exists, checked in the guard
                let _ = self.select_sheet(&sheet);
            }
            _ => self.show_sheets(),
        }
    }

    pub fn show_detail(&mut self, code: &str) -> CoreResult<()> {
        let position = self
            .require_index()?
            .position_of_code(code)
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;
        self.selected_product = Some(position);
        self.view = Some(ViewKind::Detail);
        Ok(())
    }

    /// Returns from the detail view to the listing it was opened from.
    pub fn back_to_list(&mut self) {
        self.selected_product = None;
        if self.search_mode || self.selected_sheet.is_some() {
            self.view = Some(ViewKind::Products);
        } else {
            self.show_sheets();
        }
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Moves the listing to `page`. No-op outside a listing or out of range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.view == Some(ViewKind::Products) && self.pagination.go_to(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.pagination.current_page() + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        let page = self.pagination.current_page().saturating_sub(1);
        self.go_to_page(page)
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.go_to_page(self.pagination.total_pages())
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn view(&self) -> Option<ViewKind> {
        self.view
    }

    pub fn is_search_mode(&self) -> bool {
        self.search_mode
    }

    pub fn selected_sheet(&self) -> Option<&str> {
        self.selected_sheet.as_deref()
    }

    pub fn selected_product(&self) -> Option<&Product> {
        let index = self.index.as_ref()?;
        self.selected_product.and_then(|i| index.product(i))
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Global positions of the products in the current listing.
    pub fn listing_positions(&self) -> Vec<usize> {
        if self.search_mode {
            return self.search_results.clone();
        }
        match (&self.index, &self.selected_sheet) {
            (Some(index), Some(sheet)) => index
                .sheet_positions(sheet)
                .map(|range| range.collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Re-renders whatever view is current.
    pub fn refresh_current_view(&mut self) -> Screen<'_> {
        self.refresh_totals();
        self.render()
    }

    /// The screen model for the current state.
    pub fn render(&self) -> Screen<'_> {
        if let Some(message) = &self.load_error {
            return Screen::LoadError { message };
        }
        let Some(index) = &self.index else {
            return Screen::Empty;
        };

        match self.view {
            None | Some(ViewKind::Sheets) => Screen::Sheets(SheetsOverview {
                sheet_count: index.sheet_count(),
                product_count: index.len(),
                sheets: index.non_empty_sheets(),
            }),
            Some(ViewKind::Products) => {
                let positions = self.listing_positions();
                let products = self
                    .pagination
                    .page_of(&positions)
                    .iter()
                    .filter_map(|i| index.product(*i))
                    .collect();
                let source = if self.search_mode {
                    ListingSource::Search {
                        term: self.search_term.trim(),
                    }
                } else {
                    ListingSource::Sheet(self.selected_sheet.as_deref().unwrap_or_default())
                };
                Screen::Listing(Listing {
                    source,
                    products,
                    pagination: &self.pagination,
                    page_window: self.pagination.page_window(),
                    showing: self.pagination.showing_range(),
                })
            }
            Some(ViewKind::Detail) => match self.selected_product() {
                Some(product) => Screen::Detail(ProductDetail {
                    product,
                    fields: product.detail_fields(),
                }),
                None => Screen::Empty,
            },
        }
    }

    fn enter_listing(&mut self, total_items: usize) {
        self.pagination.reset();
        self.pagination.set_total_items(total_items);
        self.view = Some(ViewKind::Products);
    }

    fn refresh_totals(&mut self) {
        if self.view == Some(ViewKind::Products) {
            let total = self.listing_positions().len();
            self.pagination.set_total_items(total);
        }
    }

    fn clear_search_state(&mut self) {
        self.search_term.clear();
        self.search_results.clear();
        self.search_mode = false;
    }
}
