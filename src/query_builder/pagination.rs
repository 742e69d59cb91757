use serde::{Deserialize, Serialize};

use super::QueryError;

/// Default page size when the caller does not supply one
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Hard cap; larger requested limits are clamped down to this
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated 1-based page request.
///
/// `page < 1` and `limit < 1` are rejected rather than silently clamped;
/// oversized limits are capped at [`MAX_PAGE_SIZE`] (the cap mirrors what
/// callers of the original system observed and is not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPage { page });
        }
        if limit < 1 {
            return Err(QueryError::InvalidLimit { limit });
        }
        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn to_sql(&self) -> String {
        format!(" LIMIT {} OFFSET {}", self.limit, self.offset())
    }

    /// Ceiling division, at least one page even when empty
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Page envelope returned by every list query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: request.total_pages(total),
        }
    }
}
