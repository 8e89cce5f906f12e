//! Filter and predicate types for repository queries
//!
//! A [`Condition`] is the conjunction of zero or more [`FilterCondition`]s. Each
//! filter pairs a column name with a [`Predicate`] from a closed set: equality,
//! case-sensitive substring match, or an inclusive range.
//!
//! Filters are usually assembled from optional request parameters. The `_opt`
//! constructors return `None` when the input is absent, and [`build_predicate`]
//! drops those entries before composing the final condition.
//!
//! # Example
//!
//! ```rust
//! use catalog_service::repository::{build_predicate, FilterCondition};
//!
//! let name: Option<String> = Some("TV".to_string());
//! let min_price: Option<f64> = Some(10.0);
//! let max_price: Option<f64> = None;
//!
//! let condition = build_predicate([
//!     FilterCondition::contains_opt("name", name),
//!     FilterCondition::between_opt("price", min_price, max_price),
//! ]);
//!
//! // The price range is missing a bound and is dropped entirely.
//! assert_eq!(condition.len(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// A value that can be compared against a column
///
/// ```rust
/// use catalog_service::repository::FilterValue;
///
/// let name: FilterValue = "Smart TV".into();
/// let quantity: FilterValue = 5_i32.into();
/// assert_eq!(quantity, FilterValue::Integer(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    /// Compare two values of compatible types
    ///
    /// Integers and floats compare numerically with each other. Values of
    /// unrelated types are incomparable and yield `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

/// The closed set of predicate kinds a filter can apply
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column equals the value
    Equals(FilterValue),
    /// Column contains the substring (case-sensitive, wildcarded both sides)
    Contains(String),
    /// Column lies within the inclusive range `[low, high]`
    Between(FilterValue, FilterValue),
}

impl Predicate {
    /// Evaluate the predicate against a column value
    ///
    /// A missing (null) column never matches.
    pub fn matches(&self, candidate: Option<&FilterValue>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };

        match self {
            Self::Equals(value) => candidate.compare(value) == Some(Ordering::Equal),
            Self::Contains(needle) => {
                matches!(candidate, FilterValue::String(s) if s.contains(needle.as_str()))
            }
            Self::Between(low, high) => {
                matches!(
                    candidate.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    candidate.compare(high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
        }
    }
}

/// A single filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The column to filter on
    pub field: String,
    /// The predicate applied to the column
    pub predicate: Predicate,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    /// Create an equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Predicate::Equals(value.into()))
    }

    /// Create a substring filter (field LIKE '%needle%')
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, Predicate::Contains(needle.into()))
    }

    /// Create an inclusive range filter (field BETWEEN low AND high)
    pub fn between(
        field: impl Into<String>,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> Self {
        Self::new(field, Predicate::Between(low.into(), high.into()))
    }

    /// Equality filter, or `None` when the value is absent
    pub fn eq_opt<V: Into<FilterValue>>(field: impl Into<String>, value: Option<V>) -> Option<Self> {
        value.map(|v| Self::eq(field, v))
    }

    /// Substring filter, or `None` when the needle is absent
    ///
    /// An empty needle is still present and matches every non-null value.
    pub fn contains_opt<S: Into<String>>(
        field: impl Into<String>,
        needle: Option<S>,
    ) -> Option<Self> {
        needle.map(|n| Self::contains(field, n))
    }

    /// Range filter, or `None` unless both bounds are present
    ///
    /// ```rust
    /// use catalog_service::repository::FilterCondition;
    ///
    /// assert!(FilterCondition::between_opt("price", Some(1.0_f64), Some(2.0)).is_some());
    /// assert!(FilterCondition::between_opt("price", Some(1.0), None::<f64>).is_none());
    /// ```
    pub fn between_opt<V: Into<FilterValue>>(
        field: impl Into<String>,
        low: Option<V>,
        high: Option<V>,
    ) -> Option<Self> {
        match (low, high) {
            (Some(low), Some(high)) => Some(Self::between(field, low, high)),
            _ => None,
        }
    }
}

/// Conjunction of filters used to locate entities
///
/// An empty condition matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    filters: Vec<FilterCondition>,
}

impl Condition {
    /// A condition with no filters
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Single equality condition, the usual way to address a record by key
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            filters: vec![FilterCondition::eq(field, value)],
        }
    }

    /// Add another filter to the conjunction
    #[must_use]
    pub fn and(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    /// The filters making up this condition, in declaration order
    pub fn filters(&self) -> &[FilterCondition] {
        &self.filters
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the condition has no filters
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Evaluate the condition, looking up each field through `column`
    pub fn matches<F>(&self, column: F) -> bool
    where
        F: Fn(&str) -> Option<FilterValue>,
    {
        self.filters
            .iter()
            .all(|f| f.predicate.matches(column(&f.field).as_ref()))
    }
}

impl From<Vec<FilterCondition>> for Condition {
    fn from(filters: Vec<FilterCondition>) -> Self {
        Self { filters }
    }
}

impl FromIterator<FilterCondition> for Condition {
    fn from_iter<I: IntoIterator<Item = FilterCondition>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

/// Compose optional filter entries into a conjunctive condition
///
/// Absent entries are dropped; order of the remaining entries is preserved.
pub fn build_predicate<I>(entries: I) -> Condition
where
    I: IntoIterator<Item = Option<FilterCondition>>,
{
    entries.into_iter().flatten().collect()
}
