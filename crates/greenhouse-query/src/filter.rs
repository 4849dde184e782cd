//! Reading filters and pagination.

use greenhouse_model::{Reading, ReadingStatus, Timestamp};

use crate::error::{QueryError, Result};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;

/// Conditions a reading must satisfy, combined with logical AND.
///
/// Date bounds are inclusive and compare instants. A reading without a
/// parseable timestamp never matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    pub kind: Option<String>,
    pub status: Option<ReadingStatus>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the inclusive lower bound from date-time text.
    pub fn with_start(mut self, text: &str) -> Result<Self> {
        self.start = Some(parse_bound("start", text)?);
        Ok(self)
    }

    /// Set the inclusive upper bound from date-time text.
    pub fn with_end(mut self, text: &str) -> Result<Self> {
        self.end = Some(parse_bound("end", text)?);
        Ok(self)
    }

    /// Whether `reading`, whose sensor resolves to `kind`, passes every
    /// condition.
    pub fn matches(&self, kind: Option<&str>, reading: &Reading) -> bool {
        if let Some(wanted) = self.kind.as_deref()
            && kind != Some(wanted)
        {
            return false;
        }
        if let Some(wanted) = self.status
            && reading.status != wanted
        {
            return false;
        }
        let Some(timestamp) = reading.timestamp.as_deref().and_then(Timestamp::parse) else {
            return false;
        };
        let instant = timestamp.instant();
        if self.start.is_some_and(|start| instant < start.instant()) {
            return false;
        }
        if self.end.is_some_and(|end| instant > end.instant()) {
            return false;
        }
        true
    }
}

fn parse_bound(bound: &'static str, text: &str) -> Result<Timestamp> {
    Timestamp::parse(text).ok_or_else(|| QueryError::InvalidBound {
        bound,
        value: text.to_string(),
    })
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Result<Self> {
        if page == 0 {
            return Err(QueryError::ZeroPage);
        }
        if per_page == 0 {
            return Err(QueryError::ZeroPerPage);
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Index of the first row on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}
