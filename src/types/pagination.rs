//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use domain::ServiceResponse;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination query parameters shared by every list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (capped at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Page number with 0 treated as the first page
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Zero-based page index for SeaORM paginators
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        self.page_index() * self.limit()
    }

    /// Get limit capped at maximum, never zero
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(PaginatedServices = Paginated<ServiceResponse>)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Build a page from the rows and the total row count
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let per_page = params.limit();
        Self {
            data,
            meta: PaginationMeta {
                page: params.page(),
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
