//! Offset pagination utilities.
//!
//! The participant table paginates an already filtered and sorted in-memory
//! result set, so pagination here is plain page-index math rather than a
//! database cursor.

use serde::{Deserialize, Serialize};

/// Default number of rows per table page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Upper bound on the configurable page size.
pub const MAX_PAGE_SIZE: usize = 200;

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a request with the page size clamped into `1..=MAX_PAGE_SIZE`.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Offset of the first row on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

/// Computed pagination summary returned with every table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The page actually rendered (clamped into range).
    pub page: usize,
    pub page_size: usize,
    /// Number of pages over the filtered result set (at least 1).
    pub page_count: usize,
    /// Rows surviving the active filters.
    pub filtered: usize,
    /// Rows before filtering.
    pub total: usize,
}

impl PageInfo {
    /// Compute the summary for `filtered` matching rows out of `total`,
    /// clamping the requested page so it never lands past the last page.
    pub fn compute(request: PageRequest, filtered: usize, total: usize) -> Self {
        let page_count = filtered.div_ceil(request.page_size).max(1);
        Self {
            page: request.page.min(page_count - 1),
            page_size: request.page_size,
            page_count,
            filtered,
            total,
        }
    }

    /// Bounds of the rendered page as a `start..end` range into the
    /// filtered row slice.
    pub fn bounds(&self) -> (usize, usize) {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.filtered);
        (start.min(end), end)
    }
}
