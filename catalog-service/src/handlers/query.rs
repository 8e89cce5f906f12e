//! Query types for list operations
//!
//! Query-string values arrive as raw strings so that a malformed number is
//! reported in the usual error envelope rather than as an extractor rejection.
//!
//! # Example
//!
//! ```rust
//! use catalog_service::handlers::ListQuery;
//!
//! let query = ListQuery::new().with_page("2").with_per_page("50");
//! let request = query.validate(100).unwrap();
//! assert_eq!(request.page, Some(2));
//! assert_eq!(request.per_page, Some(50));
//! ```

use serde::{Deserialize, Serialize};

use crate::repository::OrderDirection;

/// Pagination and ordering parameters shared by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Items per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<String>,

    /// Field to order by, in its API spelling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,

    /// `ASC` or `DESC`, case-insensitive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_direction: Option<String>,
}

/// Validated form of [`ListQuery`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Requested page, if any
    pub page: Option<u64>,
    /// Requested page size, if any
    pub per_page: Option<u64>,
    /// Ordering, present only when both the field and the direction were given
    pub order: Option<(String, OrderDirection)>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListQuery {
    /// Create a new empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the number of items per page
    #[must_use]
    pub fn with_per_page(mut self, per_page: impl Into<String>) -> Self {
        self.per_page = Some(per_page.into());
        self
    }

    /// Set the ordering field and direction
    #[must_use]
    pub fn with_order(mut self, name: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_name = Some(name.into());
        self.order_direction = Some(direction.into());
        self
    }

    /// Parse and range-check every field, collecting all violations
    ///
    /// Page 0 is accepted and later treated as page 1. A page size above
    /// `max_per_page` is rejected rather than truncated.
    pub fn validate(&self, max_per_page: u64) -> Result<ListRequest, Vec<String>> {
        let mut errors = Vec::new();

        let page = match present(&self.page).map(str::parse::<u64>) {
            None => None,
            Some(Ok(page)) => Some(page),
            Some(Err(_)) => {
                errors.push("Página deve ser um número inteiro positivo".to_string());
                None
            }
        };

        let per_page = match present(&self.per_page).map(str::parse::<u64>) {
            None => None,
            Some(Ok(0)) | Some(Err(_)) => {
                errors.push("Itens por página deve ser um número inteiro positivo".to_string());
                None
            }
            Some(Ok(n)) if n > max_per_page => {
                errors.push(format!(
                    "Itens por página deve ser no máximo {}",
                    max_per_page
                ));
                None
            }
            Some(Ok(n)) => Some(n),
        };

        let direction = match present(&self.order_direction).map(str::parse::<OrderDirection>) {
            None => None,
            Some(Ok(direction)) => Some(direction),
            Some(Err(_)) => {
                errors.push("Direção da ordenação deve ser ASC ou DESC".to_string());
                None
            }
        };

        let order = match (present(&self.order_name), direction) {
            (Some(name), Some(direction)) => Some((name.to_string(), direction)),
            _ => None,
        };

        if errors.is_empty() {
            Ok(ListRequest {
                page,
                per_page,
                order,
            })
        } else {
            Err(errors)
        }
    }
}
