//! Offset pagination helpers producing length-aware pages.

use gazette_api_types::Paginated;
use serde::Serialize;
use thiserror::Error;

/// One-based page request with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u32,
}

impl PageRequest {
    /// Pages below one are clamped to the first page; a zero page size is
    /// clamped to one item.
    pub fn new(page: u64, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.per_page))
    }
}

/// A page of items together with the total row count of the query.
#[derive(Debug, Clone, Serialize)]
pub struct LengthAwarePage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u32,
}

impl<T> LengthAwarePage<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Last page number; an empty result still reports page one.
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page)).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> LengthAwarePage<U> {
        LengthAwarePage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn into_envelope(self) -> Paginated<T> {
        let last_page = self.last_page();
        let len = self.items.len() as u64;
        let (from, to) = if len == 0 {
            (None, None)
        } else {
            let offset = PageRequest::new(self.page, self.per_page).offset();
            (
                Some(offset.saturating_add(1)),
                Some(offset.saturating_add(len)),
            )
        };

        Paginated {
            data: self.items,
            total: self.total,
            current_page: self.page,
            per_page: u64::from(self.per_page),
            last_page,
            from,
            to,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid page parameter: {0}")]
    InvalidPage(String),
}

/// Parse a raw `page` query value. Missing or blank values mean page one,
/// values below one are clamped, anything non-numeric is rejected.
pub fn parse_page(raw: Option<&str>) -> Result<u64, PaginationError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(1);
    };

    match raw.parse::<i64>() {
        Ok(value) if value < 1 => Ok(1),
        Ok(value) => Ok(value as u64),
        Err(err) => Err(PaginationError::InvalidPage(format!("`{raw}`: {err}"))),
    }
}
