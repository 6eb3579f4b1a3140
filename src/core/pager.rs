use super::request::QueryParams;
use crate::api::RestError;
use crate::api::models::Pagination;

pub const DEFAULT_PAGE_NUMBER: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// No limit on `pageSize` unless one is configured.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 0;

pub const PAGE_NUMBER_PARAM: &str = "pageNumber";
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Reads `pageNumber` / `pageSize`.
    ///
    /// Missing or non-numeric values fall back to the defaults. Zero or
    /// negative values are rejected with 400 (sub-codes 006 and 007). A
    /// non-zero `max_page_size` caps the size; zero leaves it unlimited.
    pub fn from_query(
        query: &QueryParams,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Result<Self, RestError> {
        let page_number = match parse_param(query, PAGE_NUMBER_PARAM) {
            Some(value) if value < 1 => {
                return Err(RestError::new(
                    400,
                    6,
                    "Bad Request",
                    format!("The page number '{}' must be 1 or greater", value),
                ));
            }
            Some(value) => value as usize,
            None => DEFAULT_PAGE_NUMBER,
        };

        let page_size = match parse_param(query, PAGE_SIZE_PARAM) {
            Some(value) if value < 1 => {
                return Err(RestError::new(
                    400,
                    7,
                    "Bad Request",
                    format!("The page size '{}' must be 1 or greater", value),
                ));
            }
            Some(value) => value as usize,
            None => default_page_size.max(1),
        };

        let page_size = match max_page_size {
            0 => page_size,
            max => page_size.min(max),
        };

        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn offset(&self) -> usize {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }

    /// Items of this page; empty when the page lies past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn pagination(&self, total_available: usize) -> Pagination {
        Pagination {
            page_number: self.page_number,
            page_size: self.page_size,
            total_available,
        }
    }
}

fn parse_param(query: &QueryParams, name: &str) -> Option<i64> {
    query.get(name)?.trim().parse::<i64>().ok()
}
