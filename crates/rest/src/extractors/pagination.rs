//! List query parameters.

use meridian_tenancy::types::{DEFAULT_LIMIT, Pagination};
use serde::Deserialize;

/// Query parameters of a list request: `limit` (default 10, max 100) and
/// the 1-based `page`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Page size.
    pub limit: Option<usize>,
    /// Page number.
    pub page: Option<usize>,
}

impl ListQuery {
    /// Clamped pagination.
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit.unwrap_or(DEFAULT_LIMIT), self.page.unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(ListQuery::default().pagination(), Pagination::new(10, 1));

        let query = ListQuery {
            limit: Some(1000),
            page: Some(0),
        };
        let pagination = query.pagination();
        assert_eq!(pagination.limit, 100);
        assert_eq!(pagination.page, 1);
    }
}
