//! Pagination and ordering for repository queries
//!
//! [`paginate`] is the single place the page arithmetic lives: it turns a
//! 1-indexed page and a page size into an offset/limit window and computes the
//! last page for a known total.
//!
//! # Example
//!
//! ```rust
//! use catalog_service::repository::paginate;
//!
//! let window = paginate(25, 3, 10);
//! assert_eq!(window.offset, 20);
//! assert_eq!(window.limit, 10);
//! assert_eq!(window.last_page, 3);
//! ```

use std::fmt;
use std::str::FromStr;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Largest page size accepted at the HTTP boundary
pub const MAX_PER_PAGE: u64 = 100;

/// Direction for ordering results
///
/// Nulls always sort last regardless of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Error returned when parsing an unknown order direction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order direction '{0}', expected ASC or DESC")]
pub struct ParseOrderDirectionError(pub String);

impl FromStr for OrderDirection {
    type Err = ParseOrderDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Descending)
        } else {
            Err(ParseOrderDirectionError(s.to_string()))
        }
    }
}

/// Column and direction to sort by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column name as declared by the entity
    pub column: String,
    /// Sort direction
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Sort by `column` in `direction`
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Ascending sort on `column`
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Ascending)
    }

    /// Descending sort on `column`
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Descending)
    }
}

/// Offset/limit pair handed to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create pagination parameters from a raw offset and limit
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Pagination for a 1-indexed page number; page 0 is treated as page 1
    ///
    /// ```rust
    /// use catalog_service::repository::Pagination;
    ///
    /// let page3 = Pagination::page(3, 20);
    /// assert_eq!(page3.offset, 40);
    /// assert_eq!(page3.limit, 20);
    /// ```
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        Self {
            offset,
            limit: page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, DEFAULT_PER_PAGE)
    }
}

/// Result of the page arithmetic for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows to skip
    pub offset: u64,
    /// Rows to take
    pub limit: u64,
    /// Last page holding data, or 0 when there is none
    pub last_page: u64,
}

/// Compute the query window and last page for `total` rows
///
/// `page < 1` is normalized to 1. A `per_page` of 0 yields an empty window
/// with `last_page = 0`.
pub fn paginate(total: u64, page: u64, per_page: u64) -> PageWindow {
    let Pagination { offset, limit } = Pagination::page(page.max(1), per_page);
    PageWindow {
        offset,
        limit,
        last_page: last_page(total, per_page),
    }
}

/// `ceil(total / per_page)`, or 0 when there are no rows
pub fn last_page(total: u64, per_page: u64) -> u64 {
    if total == 0 || per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}
