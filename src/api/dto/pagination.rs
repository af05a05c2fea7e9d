//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::PaginationConfig;

/// Query parameters for pagination.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[param(minimum = 1, example = 1)]
    pub page: Option<u32>,

    /// Number of items per page, capped at the configured maximum
    #[param(minimum = 1, example = 20)]
    pub page_size: Option<u32>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl PaginationParams {
    /// Fills in defaults and caps the page size. Zero values fall back to
    /// the defaults rather than failing.
    pub fn resolve(&self, config: &PaginationConfig) -> Page {
        let number = self.page.filter(|p| *p > 0).unwrap_or(1);
        let size = self
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);

        Page { number, size }
    }
}

impl Page {
    /// Calculates the offset for database queries.
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// Total number of items across all pages
    #[schema(example = 42)]
    pub count: u64,

    /// Current page number (1-based)
    #[schema(example = 1)]
    pub page: u32,

    #[schema(example = 20)]
    pub page_size: u32,

    #[schema(example = 3)]
    pub total_pages: u32,

    pub has_next: bool,

    pub has_prev: bool,

    /// The items on this page
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// Creates a new paged response.
    pub fn new(results: Vec<T>, page: Page, count: i64) -> Self {
        let count = u64::try_from(count).unwrap_or(0);
        let total_pages = u32::try_from(count.div_ceil(u64::from(page.size))).unwrap_or(u32::MAX);

        Self {
            count,
            page: page.number,
            page_size: page.size,
            total_pages,
            has_next: page.number < total_pages,
            has_prev: page.number > 1,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let page = PaginationParams::default().resolve(&config());
        assert_eq!(page, Page { number: 1, size: 20 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_resolve_caps_and_ignores_zero() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(500),
        };
        assert_eq!(params.resolve(&config()), Page { number: 1, size: 100 });
    }

    #[test]
    fn test_offset() {
        let page = Page { number: 3, size: 10 };
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_paged_response_metadata() {
        let response = PagedResponse::new(vec![1, 2], Page { number: 2, size: 2 }, 5);
        assert_eq!(response.count, 5);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_next);
        assert!(response.has_prev);

        let empty: PagedResponse<i32> = PagedResponse::new(vec![], Page { number: 1, size: 20 }, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_paged_response_serializes_results_last() {
        let json =
            serde_json::to_value(PagedResponse::new(vec!["a"], Page { number: 1, size: 20 }, 1))
                .unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0], "a");
    }
}
