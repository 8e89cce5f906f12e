//! PostgreSQL entity store
//!
//! Queries are assembled with sqlx's [`QueryBuilder`]. Every value is bound as a
//! parameter; the only text spliced into SQL is the entity's own constants and
//! column/alias names that have already passed validation.

use std::marker::PhantomData;

use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::error::{RepositoryError, RepositoryOperation};
use super::filter::{Condition, FilterValue, Predicate};
use super::traits::{
    validate_columns, validate_identifier, validate_relations, Changeset, Entity, EntityStore,
    Insertable, PageQuery, RepositoryResult,
};

/// [`EntityStore`] backed by a PostgreSQL pool
pub struct PgStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for PgStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore").field("pool", &self.pool).finish()
    }
}

impl<E> PgStore<E> {
    /// Create a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escape LIKE metacharacters so the needle matches literally
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::String(s) => qb.push_bind(s.clone()),
        FilterValue::Integer(n) => qb.push_bind(*n),
        FilterValue::Float(n) => qb.push_bind(*n),
        FilterValue::Boolean(b) => qb.push_bind(*b),
        FilterValue::Timestamp(t) => qb.push_bind(*t),
    };
}

fn push_column(qb: &mut QueryBuilder<'static, Postgres>, alias: Option<&str>, column: &str) {
    if let Some(alias) = alias {
        qb.push(alias).push(".");
    }
    qb.push(column);
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, alias: Option<&str>, condition: &Condition) {
    for (i, filter) in condition.filters().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_column(qb, alias, &filter.field);
        match &filter.predicate {
            Predicate::Equals(value) => {
                qb.push(" = ");
                push_value(qb, value);
            }
            Predicate::Contains(needle) => {
                qb.push(" LIKE ");
                qb.push_bind(format!("%{}%", escape_like(needle)));
                qb.push(" ESCAPE '\\'");
            }
            Predicate::Between(low, high) => {
                qb.push(" BETWEEN ");
                push_value(qb, low);
                qb.push(" AND ");
                push_value(qb, high);
            }
        }
    }
}

/// `SELECT ... FROM table AS alias WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
///
/// The caller validates the alias and columns first.
fn select_page<E: Entity>(query: &PageQuery) -> QueryBuilder<'static, Postgres> {
    let alias = query.alias.as_str();
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(E::PROJECTION)
        .push(" FROM ")
        .push(E::TABLE)
        .push(" AS ")
        .push(alias);
    push_where(&mut qb, Some(alias), &query.condition);

    if let Some(order) = &query.order {
        qb.push(" ORDER BY ");
        push_column(&mut qb, Some(alias), &order.column);
        qb.push(" ").push(order.direction.as_sql()).push(" NULLS LAST");
    }

    qb.push(" LIMIT ")
        .push_bind(clamp_i64(query.pagination.limit))
        .push(" OFFSET ")
        .push_bind(clamp_i64(query.pagination.offset));
    qb
}

/// `SELECT COUNT(*)` over the same filter as [`select_page`], without the window
fn count_matching<E: Entity>(query: &PageQuery) -> QueryBuilder<'static, Postgres> {
    let alias = query.alias.as_str();
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(E::TABLE).push(" AS ").push(alias);
    push_where(&mut qb, Some(alias), &query.condition);
    qb
}

fn select_one<E: Entity>(condition: &Condition) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(E::PROJECTION).push(" FROM ").push(E::TABLE);
    push_where(&mut qb, None, condition);
    qb.push(" LIMIT 1");
    qb
}

fn insert_row<E: Entity>(values: &[(&'static str, FilterValue)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(E::TABLE);

    if values.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        qb.push(" (");
        for (i, (column, _)) in values.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(")");
    }

    qb.push(" RETURNING ").push(E::PROJECTION);
    qb
}

/// `UPDATE ... SET ... RETURNING id`, or a plain id lookup when nothing changes
fn update_rows<E: Entity>(
    condition: &Condition,
    changes: &[(&'static str, FilterValue)],
) -> QueryBuilder<'static, Postgres> {
    if changes.is_empty() && E::UPDATED_AT_COLUMN.is_none() {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(E::ID_COLUMN).push(" FROM ").push(E::TABLE);
        push_where(&mut qb, None, condition);
        return qb;
    }

    let mut qb = QueryBuilder::new("UPDATE ");
    qb.push(E::TABLE).push(" SET ");
    for (i, (column, value)) in changes.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" = ");
        push_value(&mut qb, value);
    }
    if let Some(updated_at) = E::UPDATED_AT_COLUMN {
        if !changes.is_empty() {
            qb.push(", ");
        }
        qb.push(updated_at).push(" = now()");
    }
    push_where(&mut qb, None, condition);
    qb.push(" RETURNING ").push(E::ID_COLUMN);
    qb
}

fn delete_rows<E: Entity>(condition: &Condition) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("DELETE FROM ");
    qb.push(E::TABLE);
    push_where(&mut qb, None, condition);
    qb
}

fn validate_write_columns(
    operation: RepositoryOperation,
    values: &[(&'static str, FilterValue)],
) -> RepositoryResult<()> {
    values
        .iter()
        .try_for_each(|(column, _)| validate_identifier(operation, column))
}

fn db_error<E: Entity>(operation: RepositoryOperation) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| {
        RepositoryError::from(err)
            .with_operation(operation)
            .with_entity(E::NAME)
    }
}

impl<E> EntityStore<E> for PgStore<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
    E::Id: Unpin + for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    async fn insert(&self, payload: &E::Create) -> RepositoryResult<E> {
        let values = payload.values();
        validate_write_columns(RepositoryOperation::Insert, &values)?;

        let mut qb = insert_row::<E>(&values);
        qb.build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::Insert))
    }

    async fn find_one(
        &self,
        condition: &Condition,
        relations: &[String],
    ) -> RepositoryResult<Option<E>> {
        validate_columns::<E>(RepositoryOperation::FindOne, condition, None)?;
        validate_relations::<E>(RepositoryOperation::FindOne, relations)?;

        let mut qb = select_one::<E>(condition);
        qb.build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::FindOne))
    }

    async fn find_page(&self, query: &PageQuery) -> RepositoryResult<(Vec<E>, u64)> {
        validate_identifier(RepositoryOperation::FindPage, &query.alias)?;
        validate_columns::<E>(
            RepositoryOperation::FindPage,
            &query.condition,
            query.order.as_ref(),
        )?;
        validate_relations::<E>(RepositoryOperation::FindPage, &query.relations)?;

        let mut count = count_matching::<E>(query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::FindPage))?;

        let mut select = select_page::<E>(query);
        let rows = select
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::FindPage))?;

        Ok((rows, u64::try_from(total).unwrap_or_default()))
    }

    async fn update(&self, condition: &Condition, changes: &E::Update) -> RepositoryResult<Vec<E::Id>> {
        validate_columns::<E>(RepositoryOperation::Update, condition, None)?;
        let changes = changes.changes();
        validate_write_columns(RepositoryOperation::Update, &changes)?;

        let mut qb = update_rows::<E>(condition, &changes);
        qb.build_query_scalar::<E::Id>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::Update))
    }

    async fn delete(&self, condition: &Condition) -> RepositoryResult<u64> {
        validate_columns::<E>(RepositoryOperation::Delete, condition, None)?;

        let mut qb = delete_rows::<E>(condition);
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_error::<E>(RepositoryOperation::Delete))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::Product;
    use crate::repository::{FilterCondition, OrderBy, Pagination};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("TV"), "TV");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\"), "c:\\\\");
    }

    #[test]
    fn test_select_page_sql() {
        let query = PageQuery {
            alias: "products".to_string(),
            condition: Condition::from(vec![
                FilterCondition::contains("name", "TV"),
                FilterCondition::between("price", 10.0_f64, 20.0_f64),
            ]),
            order: Some(OrderBy::asc("name")),
            pagination: Pagination::page(1, 10),
            relations: Vec::new(),
        };

        let qb = select_page::<Product>(&query);
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {} FROM products AS products \
                 WHERE products.name LIKE $1 ESCAPE '\\' \
                 AND products.price BETWEEN $2 AND $3 \
                 ORDER BY products.name ASC NULLS LAST LIMIT $4 OFFSET $5",
                Product::PROJECTION
            )
        );
    }

    #[test]
    fn test_count_uses_same_filter_without_window() {
        let query = PageQuery {
            condition: Condition::eq("name", "TV"),
            order: Some(OrderBy::desc("price")),
            ..PageQuery::new("p")
        };

        let qb = count_matching::<Product>(&query);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM products AS p WHERE p.name = $1"
        );
    }

    #[test]
    fn test_unfiltered_select_has_no_where() {
        let qb = select_page::<Product>(&PageQuery::new("products"));
        assert!(!qb.sql().contains("WHERE"));
        assert!(!qb.sql().contains("ORDER BY"));
    }

    #[test]
    fn test_insert_sql_returns_projection() {
        let values = vec![
            ("name", FilterValue::from("TV")),
            ("price", FilterValue::from(1569.25)),
            ("stock_quantity", FilterValue::from(5_i32)),
        ];
        let qb = insert_row::<Product>(&values);
        assert_eq!(
            qb.sql(),
            format!(
                "INSERT INTO products (name, price, stock_quantity) VALUES ($1, $2, $3) RETURNING {}",
                Product::PROJECTION
            )
        );
    }

    #[test]
    fn test_update_sql_refreshes_updated_at() {
        let changes = vec![("name", FilterValue::from("Radio"))];
        let qb = update_rows::<Product>(&Condition::eq("id", 111_i64), &changes);
        assert_eq!(
            qb.sql(),
            "UPDATE products SET name = $1, updated_at = now() WHERE id = $2 RETURNING id"
        );
    }

    #[test]
    fn test_update_sql_with_no_changes_still_touches_timestamp() {
        let qb = update_rows::<Product>(&Condition::eq("id", 1_i64), &[]);
        assert_eq!(
            qb.sql(),
            "UPDATE products SET updated_at = now() WHERE id = $1 RETURNING id"
        );
    }

    #[test]
    fn test_delete_sql() {
        let qb = delete_rows::<Product>(&Condition::eq("id", 7_i64));
        assert_eq!(qb.sql(), "DELETE FROM products WHERE id = $1");
    }

    #[test]
    fn test_select_one_sql() {
        let qb = select_one::<Product>(&Condition::eq("name", "TV"));
        assert_eq!(
            qb.sql(),
            format!("SELECT {} FROM products WHERE name = $1 LIMIT 1", Product::PROJECTION)
        );
    }
}
