// Query engine: translates filter + pagination + sort specifications into
// store queries and wraps results in the page envelope.

pub mod filters;
pub mod pagination;

pub use filters::{RequestFilter, SortField, SortOrder, SortSpec};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use thiserror::Error;

/// Malformed query specifications, rejected before any store access
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("page must be >= 1, got {page}")]
    InvalidPage { page: u32 },

    #[error("limit must be >= 1, got {limit}")]
    InvalidLimit { limit: u32 },

    #[error("unknown sort field: {field}")]
    InvalidSortField { field: String },

    #[error("sort order must be 'asc' or 'desc', got {order}")]
    InvalidSortOrder { order: String },
}
