//! Entity and store trait definitions
//!
//! [`Entity`] describes a record type to the stores: its table, key, the columns
//! a query may reference and how to read a column back as a [`FilterValue`].
//! [`EntityStore`] is the narrow capability the CRUD core is parameterized over.
//!
//! Async methods use RPITIT (Return Position Impl Trait In Traits) rather than
//! `async_trait`.

use std::fmt;
use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;

use super::error::{RepositoryError, RepositoryOperation};
use super::filter::{Condition, FilterValue};
use super::pagination::{OrderBy, Pagination};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Identifiers spliced into SQL must match this pattern
static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid")
});

/// A persistent record type
///
/// # Example
///
/// ```rust,ignore
/// impl Entity for Product {
///     type Id = i64;
///     type Create = NewProduct;
///     type Update = ProductChanges;
///
///     const NAME: &'static str = "Product";
///     const TABLE: &'static str = "products";
///     const COLUMNS: &'static [&'static str] = &["id", "name", "price"];
///     const PROJECTION: &'static str = "id, name, price";
///
///     fn id(&self) -> i64 { self.id }
///     fn column(&self, name: &str) -> Option<FilterValue> { /* ... */ }
/// }
/// ```
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Identifier type
    type Id: Copy + fmt::Debug + fmt::Display + Send + Sync + Into<FilterValue> + 'static;
    /// Payload accepted by `insert`
    type Create: Insertable + Send + Sync;
    /// Partial update accepted by `update`
    type Update: Changeset + Send + Sync;

    /// Human-readable entity name used in errors and logs
    const NAME: &'static str;
    /// Backing table
    const TABLE: &'static str;
    /// Primary key column
    const ID_COLUMN: &'static str = "id";
    /// Columns that filters and ordering may reference
    const COLUMNS: &'static [&'static str];
    /// Relations that may be eagerly loaded
    const RELATIONS: &'static [&'static str] = &[];
    /// SELECT list producing a row decodable into the entity
    const PROJECTION: &'static str;
    /// Column the backend refreshes on every update, if any
    const UPDATED_AT_COLUMN: Option<&'static str> = None;

    /// The record's identifier
    fn id(&self) -> Self::Id;

    /// Read a column by name; `None` for null or unknown columns
    fn column(&self, name: &str) -> Option<FilterValue>;
}

/// Column/value pairs for a new record
pub trait Insertable {
    /// Values to insert, in column order
    fn values(&self) -> Vec<(&'static str, FilterValue)>;
}

/// Column/value pairs for a partial update
///
/// Only fields that were provided appear in [`Changeset::changes`].
pub trait Changeset {
    /// Values to set
    fn changes(&self) -> Vec<(&'static str, FilterValue)>;

    /// Whether the changeset sets nothing
    fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}

/// Everything a store needs to fetch one page of records
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Alias the table is queried under
    pub alias: String,
    /// Conjunctive filter
    pub condition: Condition,
    /// Optional ordering; `None` keeps the backend's order
    pub order: Option<OrderBy>,
    /// Window to return
    pub pagination: Pagination,
    /// Relations to eagerly load
    pub relations: Vec<String>,
}

impl PageQuery {
    /// A first-page query over every record of `alias`
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            condition: Condition::all(),
            order: None,
            pagination: Pagination::default(),
            relations: Vec::new(),
        }
    }
}

/// Backend capability the CRUD core is built on
///
/// Implementations evaluate [`Condition`]s themselves; the core never inspects
/// rows beyond what these methods return.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Persist a new record and return it with generated fields filled in
    fn insert(&self, payload: &E::Create) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// First record matching `condition`, if any
    fn find_one(
        &self,
        condition: &Condition,
        relations: &[String],
    ) -> impl Future<Output = RepositoryResult<Option<E>>> + Send;

    /// One page of matching records plus the total number of matches
    ///
    /// The total ignores `query.pagination`.
    fn find_page(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = RepositoryResult<(Vec<E>, u64)>> + Send;

    /// Apply `changes` to every matching record, returning the affected ids
    fn update(
        &self,
        condition: &Condition,
        changes: &E::Update,
    ) -> impl Future<Output = RepositoryResult<Vec<E::Id>>> + Send;

    /// Remove every matching record, returning the number removed
    fn delete(&self, condition: &Condition) -> impl Future<Output = RepositoryResult<u64>> + Send;
}

/// Reject names that are not plain SQL identifiers
pub fn validate_identifier(operation: RepositoryOperation, name: &str) -> RepositoryResult<()> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(RepositoryError::validation_failed(
            operation,
            format!("'{}' is not a valid identifier", name),
        ))
    }
}

/// Reject filters or ordering on columns the entity does not declare
pub fn validate_columns<E: Entity>(
    operation: RepositoryOperation,
    condition: &Condition,
    order: Option<&OrderBy>,
) -> RepositoryResult<()> {
    let fields = condition
        .filters()
        .iter()
        .map(|f| f.field.as_str())
        .chain(order.map(|o| o.column.as_str()));

    for field in fields {
        if field != E::ID_COLUMN && !E::COLUMNS.contains(&field) {
            return Err(RepositoryError::validation_failed(
                operation,
                format!("unknown column '{}'", field),
            )
            .with_entity(E::NAME));
        }
    }
    Ok(())
}

/// Reject relations the entity does not declare
pub fn validate_relations<E: Entity>(
    operation: RepositoryOperation,
    relations: &[String],
) -> RepositoryResult<()> {
    match relations
        .iter()
        .find(|r| !E::RELATIONS.contains(&r.as_str()))
    {
        Some(unknown) => Err(RepositoryError::validation_failed(
            operation,
            format!("unknown relation '{}'", unknown),
        )
        .with_entity(E::NAME)),
        None => Ok(()),
    }
}
