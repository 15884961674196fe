//! Offset pagination for list queries.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: usize = 100;

/// Requested page of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page size, clamped to `1..=MAX_LIMIT`.
    pub limit: usize,
    /// 1-based page number.
    pub page: usize,
}

impl Pagination {
    /// Creates a pagination, clamping out-of-range values.
    pub fn new(limit: usize, page: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            page: page.max(1),
        }
    }

    /// Number of rows to skip. Saturates for absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 1)
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub docs: Vec<T>,
    /// Total number of matching items across all pages.
    pub total_docs: usize,
    /// Page size used.
    pub limit: usize,
    /// 1-based page number.
    pub page: usize,
}

impl<T> Page<T> {
    /// An empty page for the given pagination.
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            docs: Vec::new(),
            total_docs: 0,
            limit: pagination.limit,
            page: pagination.page,
        }
    }
}
