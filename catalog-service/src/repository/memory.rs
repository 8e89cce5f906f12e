//! In-process entity store
//!
//! Keeps records in a `BTreeMap` keyed by a generated `i64` id, so backend
//! default ordering is insertion order. Used when no database is configured and
//! throughout the test suite.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::error::RepositoryOperation;
use super::filter::{Condition, FilterValue};
use super::pagination::{OrderBy, OrderDirection};
use super::traits::{
    validate_columns, validate_identifier, validate_relations, Entity, EntityStore, PageQuery,
    RepositoryResult,
};

/// Entities the in-memory store knows how to build and patch
pub trait MemoryRecord: Entity<Id = i64> {
    /// Build a record from an insert payload
    fn from_insert(id: i64, payload: &Self::Create, now: DateTime<Utc>) -> Self;

    /// Apply a partial update; `now` is the new "updated at" timestamp
    fn apply_changes(&mut self, changes: &Self::Update, now: DateTime<Utc>);
}

/// Thread-safe in-memory [`EntityStore`]
///
/// Clones share the same underlying rows.
#[derive(Debug)]
pub struct MemoryStore<E> {
    rows: Arc<RwLock<BTreeMap<i64, E>>>,
    next_id: Arc<AtomicI64>,
}

impl<E> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl<E> MemoryStore<E> {
    /// Create an empty store whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn compare_nullable(
    a: Option<FilterValue>,
    b: Option<FilterValue>,
    direction: OrderDirection,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = a.compare(&b).unwrap_or(Ordering::Equal);
            match direction {
                OrderDirection::Ascending => ordering,
                OrderDirection::Descending => ordering.reverse(),
            }
        }
    }
}

fn sort_rows<E: Entity>(rows: &mut [E], order: &OrderBy) {
    rows.sort_by(|a, b| {
        compare_nullable(
            a.column(&order.column),
            b.column(&order.column),
            order.direction,
        )
    });
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl<E: MemoryRecord> EntityStore<E> for MemoryStore<E> {
    async fn insert(&self, payload: &E::Create) -> RepositoryResult<E> {
        let mut rows = self.rows.write().await;
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        let record = E::from_insert(id, payload, Utc::now());
        rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_one(
        &self,
        condition: &Condition,
        relations: &[String],
    ) -> RepositoryResult<Option<E>> {
        validate_columns::<E>(RepositoryOperation::FindOne, condition, None)?;
        validate_relations::<E>(RepositoryOperation::FindOne, relations)?;

        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|row| condition.matches(|field| row.column(field)))
            .cloned())
    }

    async fn find_page(&self, query: &PageQuery) -> RepositoryResult<(Vec<E>, u64)> {
        validate_identifier(RepositoryOperation::FindPage, &query.alias)?;
        validate_columns::<E>(
            RepositoryOperation::FindPage,
            &query.condition,
            query.order.as_ref(),
        )?;
        validate_relations::<E>(RepositoryOperation::FindPage, &query.relations)?;

        let mut matched: Vec<E> = {
            let rows = self.rows.read().await;
            rows.values()
                .filter(|row| query.condition.matches(|field| row.column(field)))
                .cloned()
                .collect()
        };
        let total = matched.len() as u64;

        if let Some(order) = &query.order {
            sort_rows(&mut matched, order);
        }

        let page = matched
            .into_iter()
            .skip(to_usize(query.pagination.offset))
            .take(to_usize(query.pagination.limit))
            .collect();

        Ok((page, total))
    }

    async fn update(&self, condition: &Condition, changes: &E::Update) -> RepositoryResult<Vec<i64>> {
        validate_columns::<E>(RepositoryOperation::Update, condition, None)?;

        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let mut affected = Vec::new();
        for (id, row) in rows.iter_mut() {
            if condition.matches(|field| row.column(field)) {
                row.apply_changes(changes, now);
                affected.push(*id);
            }
        }
        Ok(affected)
    }

    async fn delete(&self, condition: &Condition) -> RepositoryResult<u64> {
        validate_columns::<E>(RepositoryOperation::Delete, condition, None)?;

        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, row| !condition.matches(|field| row.column(field)));
        Ok((before - rows.len()) as u64)
    }
}
