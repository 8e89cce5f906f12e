//! Entity storage abstractions
//!
//! The CRUD core talks to storage only through [`EntityStore`]. Two backends ship
//! with the crate:
//!
//! - [`MemoryStore`]: in-process, used when no database is configured and in tests
//! - [`PgStore`]: PostgreSQL via sqlx (feature `postgres`)
//!
//! Queries are described with [`Condition`]s built from [`FilterCondition`]s,
//! an optional [`OrderBy`] and a [`Pagination`] window.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_service::repository::{build_predicate, EntityStore, FilterCondition, PageQuery};
//!
//! let condition = build_predicate([
//!     FilterCondition::contains_opt("name", params.name),
//!     FilterCondition::between_opt("price", params.min_price, params.max_price),
//! ]);
//!
//! let (rows, total) = store
//!     .find_page(&PageQuery { condition, ..PageQuery::new("products") })
//!     .await?;
//! ```

mod error;
mod filter;
mod memory;
mod pagination;
#[cfg(feature = "postgres")]
mod postgres;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use filter::{build_predicate, Condition, FilterCondition, FilterValue, Predicate};
pub use memory::{MemoryRecord, MemoryStore};
pub use pagination::{
    last_page, paginate, OrderBy, OrderDirection, PageWindow, Pagination,
    ParseOrderDirectionError, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
pub use traits::{
    validate_columns, validate_identifier, validate_relations, Changeset, Entity, EntityStore,
    Insertable, PageQuery, RepositoryResult,
};
