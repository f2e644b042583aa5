//! # Pagination Engine
//!
//! Slices a result set into fixed-size pages and computes the page-button
//! window.
//!
//! ## Page Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total = 9, at most 5 buttons, centred on the current page              │
//! │                                                                         │
//! │  current 1:  [1] 2  3  4  5                                             │
//! │  current 5:   3  4 [5] 6  7                                             │
//! │  current 9:   5  6  7  8 [9]   (shifted left to stay in bounds)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! `1 <= current_page <= max(1, total_pages)`, re-established by every call
//! to [`Pagination::set_total_items`].

use std::ops::{Range, RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{ITEMS_PER_PAGE, MAX_VISIBLE_PAGES};

/// Pagination state for the current listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
    total_pages: usize,
    is_loading: bool,
}

impl Pagination {
    /// Creates pagination with a custom page size (minimum 1).
    pub fn new(items_per_page: usize) -> Self {
        Pagination {
            current_page: 1,
            items_per_page: items_per_page.max(1),
            total_items: 0,
            total_pages: 0,
            is_loading: false,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Back to page 1, not loading.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.is_loading = false;
    }

    /// Records a new result-set size and clamps the current page into range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.total_pages = total_items.div_ceil(self.items_per_page);
        self.current_page = self.current_page.min(self.total_pages).max(1);
    }

    /// Index range of the current page within the result set.
    pub fn slice_bounds(&self) -> Range<usize> {
        let start = (self.current_page - 1) * self.items_per_page;
        let end = (start + self.items_per_page).min(self.total_items);
        start.min(end)..end
    }

    /// The current page of `items`.
    ///
    /// `items` should have `total_items` elements; a shorter slice is clamped.
    pub fn page_of<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let bounds = self.slice_bounds();
        let end = bounds.end.min(items.len());
        let start = bounds.start.min(end);
        &items[start..end]
    }

    /// Moves to `page`.
    ///
    /// ## Returns
    /// `false` (state unchanged) when `page` is outside `1..=total_pages` or
    /// already current.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(1)
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Page numbers to show as buttons: at most five, centred on the current
    /// page and shifted to stay within `1..=total_pages`.
    pub fn page_window(&self) -> RangeInclusive<usize> {
        if self.total_pages == 0 {
            return 1..=0;
        }
        let span = MAX_VISIBLE_PAGES - 1;
        let mut start = self.current_page.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
        let end = (start + span).min(self.total_pages);
        if end - start + 1 < MAX_VISIBLE_PAGES {
            start = end.saturating_sub(span).max(1);
        }
        start..=end
    }

    /// One-based `(from, to)` of the current page for "showing X to Y of N".
    /// `(0, 0)` for an empty result set.
    pub fn showing_range(&self) -> (usize, usize) {
        let bounds = self.slice_bounds();
        if bounds.is_empty() {
            (0, 0)
        } else {
            (bounds.start + 1, bounds.end)
        }
    }

    /// Controls are only shown when there is more than one page of items.
    pub fn shows_controls(&self) -> bool {
        self.total_items > self.items_per_page
    }

    /// Validates a page number typed by the user.
    pub fn validate_page(&self, page: usize) -> Result<usize, ValidationError> {
        if page >= 1 && page <= self.total_pages {
            Ok(page)
        } else {
            Err(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: self.total_pages as i64,
            })
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(ITEMS_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_items(n: usize) -> Pagination {
        let mut p = Pagination::default();
        p.set_total_items(n);
        p
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(with_items(0).total_pages(), 0);
        assert_eq!(with_items(1).total_pages(), 1);
        assert_eq!(with_items(12).total_pages(), 1);
        assert_eq!(with_items(13).total_pages(), 2);
        assert_eq!(with_items(25).total_pages(), 3);
    }

    #[test]
    fn test_go_to_out_of_range_is_noop() {
        let mut p = with_items(25);
        assert!(p.go_to(3));
        assert!(!p.go_to(4));
        assert_eq!(p.current_page(), 3);
        assert!(!p.go_to(0));
        assert!(!p.go_to(3));
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn test_pages_concatenate_to_full_set() {
        let items: Vec<usize> = (0..25).collect();
        let mut p = with_items(items.len());
        let mut seen = p.page_of(&items).to_vec();
        while p.next() {
            seen.extend_from_slice(p.page_of(&items));
        }
        assert_eq!(seen, items);
        assert_eq!(p.page_of(&items).len(), 1);
    }

    #[test]
    fn test_shrinking_results_clamps_page() {
        let mut p = with_items(50);
        assert!(p.last());
        assert_eq!(p.current_page(), 5);

        p.set_total_items(13);
        assert_eq!(p.current_page(), 2);

        p.set_total_items(0);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.slice_bounds(), 0..0);
    }

    #[test]
    fn test_page_window() {
        let mut p = with_items(9 * 12);
        assert_eq!(p.page_window(), 1..=5);

        p.go_to(5);
        assert_eq!(p.page_window(), 3..=7);

        p.go_to(9);
        assert_eq!(p.page_window(), 5..=9);

        let p = with_items(3 * 12);
        assert_eq!(p.page_window(), 1..=3);
    }

    #[test]
    fn test_showing_range() {
        let mut p = with_items(25);
        assert_eq!(p.showing_range(), (1, 12));
        p.last();
        assert_eq!(p.showing_range(), (25, 25));
        assert_eq!(with_items(0).showing_range(), (0, 0));
    }

    #[test]
    fn test_controls_only_above_one_page() {
        assert!(!with_items(12).shows_controls());
        assert!(with_items(13).shows_controls());
    }

    #[test]
    fn test_validate_page() {
        let p = with_items(25);
        assert_eq!(p.validate_page(2), Ok(2));
        assert!(p.validate_page(4).is_err());
        assert!(p.validate_page(0).is_err());
    }

    #[test]
    fn test_reset() {
        let mut p = with_items(25);
        p.go_to(2);
        p.set_loading(true);
        p.reset();
        assert_eq!(p.current_page(), 1);
        assert!(!p.is_loading());
    }
}
