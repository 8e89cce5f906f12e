//! Generic CRUD service
//!
//! [`CrudService`] is parameterized over an [`Entity`] and the [`EntityStore`]
//! holding it. Each operation issues one logical store call (plus a confirming
//! read for updates) and wraps the outcome in an envelope or a [`CrudError`].
//! Nothing here logs; failures are returned to the caller.

use std::marker::PhantomData;

use crate::repository::{
    build_predicate, Condition, Entity, EntityStore, FilterCondition, OrderBy, PageQuery,
    Pagination, DEFAULT_PER_PAGE,
};

use super::envelope::{Envelope, PageEnvelope};
use super::error::{CrudError, CrudResult};
use super::messages::Messages;

/// Pre-insert check: if `condition` matches an existing record, creation fails
/// with a conflict carrying `message`
#[derive(Debug, Clone, PartialEq)]
pub struct UniquenessRule {
    /// Lookup that must match nothing
    pub condition: Condition,
    /// Conflict message when it does match
    pub message: String,
}

impl UniquenessRule {
    /// Create a rule
    pub fn new(condition: Condition, message: impl Into<String>) -> Self {
        Self {
            condition,
            message: message.into(),
        }
    }
}

/// Parameters for [`CrudService::find_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct FindAllParams {
    /// Alias the table is queried under
    pub table_name: String,
    /// Optional filters; absent entries are dropped and the rest are ANDed
    pub condition_filters: Vec<Option<FilterCondition>>,
    /// Optional ordering
    pub order: Option<OrderBy>,
    /// 1-indexed page, defaults to 1
    pub page: Option<u64>,
    /// Page size, defaults to the service's default
    pub per_page: Option<u64>,
    /// Relations to eagerly load
    pub relations: Vec<String>,
}

impl FindAllParams {
    /// Unfiltered first page of `table_name`
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            condition_filters: Vec::new(),
            order: None,
            page: None,
            per_page: None,
            relations: Vec::new(),
        }
    }
}

/// Generic CRUD orchestration over one entity type
pub struct CrudService<E, S> {
    store: S,
    messages: Messages,
    default_per_page: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S: Clone> Clone for CrudService<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            messages: self.messages,
            default_per_page: self.default_per_page,
            _entity: PhantomData,
        }
    }
}

impl<E, S: std::fmt::Debug> std::fmt::Debug for CrudService<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("store", &self.store)
            .field("locale", &self.messages.locale)
            .field("default_per_page", &self.default_per_page)
            .finish()
    }
}

impl<E, S> CrudService<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    /// Create a service over `store`
    pub fn new(store: S, messages: Messages) -> Self {
        Self {
            store,
            messages,
            default_per_page: DEFAULT_PER_PAGE,
            _entity: PhantomData,
        }
    }

    /// Override the page size used when a request gives none
    #[must_use]
    pub fn with_default_per_page(mut self, per_page: u64) -> Self {
        self.default_per_page = per_page.max(1);
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The message catalog in use
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    fn not_found(&self) -> CrudError {
        CrudError::not_found(self.messages.not_found)
    }

    /// Insert a record
    ///
    /// With `enforce_uniqueness`, rules are checked in order before inserting and
    /// the first one that matches aborts with [`CrudError::Conflict`].
    pub async fn create(
        &self,
        payload: &E::Create,
        enforce_uniqueness: bool,
        rules: &[UniquenessRule],
    ) -> CrudResult<Envelope<E>> {
        if enforce_uniqueness {
            for rule in rules {
                if self.store.find_one(&rule.condition, &[]).await?.is_some() {
                    return Err(CrudError::conflict(rule.message.clone()));
                }
            }
        }

        let entity = self.store.insert(payload).await?;
        Ok(Envelope::new(self.messages.created, Some(entity)))
    }

    /// Fetch exactly one record
    pub async fn find_one(
        &self,
        condition: &Condition,
        relations: &[String],
    ) -> CrudResult<Envelope<E>> {
        match self.store.find_one(condition, relations).await? {
            Some(entity) => Ok(Envelope::new(self.messages.query_ok, Some(entity))),
            None => Err(self.not_found()),
        }
    }

    /// Fetch one filtered, ordered page
    ///
    /// An empty result is a success with `total = 0`.
    pub async fn find_all(&self, params: FindAllParams) -> CrudResult<PageEnvelope<E>> {
        let page = params.page.unwrap_or(1).max(1);
        let per_page = params.per_page.unwrap_or(self.default_per_page);

        let query = PageQuery {
            alias: params.table_name,
            condition: build_predicate(params.condition_filters),
            order: params.order,
            pagination: Pagination::page(page, per_page),
            relations: params.relations,
        };

        let (data, total) = self.store.find_page(&query).await?;
        Ok(PageEnvelope::new(
            data,
            total,
            page,
            per_page,
            self.messages.query_ok,
        ))
    }

    /// Apply a partial update and return the updated record
    ///
    /// When several records match, all are updated and the first is returned.
    pub async fn update(&self, condition: &Condition, body: &E::Update) -> CrudResult<Envelope<E>> {
        let affected = self.store.update(condition, body).await?;
        let Some(id) = affected.first().copied() else {
            return Err(self.not_found());
        };

        let entity = self
            .store
            .find_one(&Condition::eq(E::ID_COLUMN, id), &[])
            .await?
            .ok_or_else(|| self.not_found())?;

        Ok(Envelope::new(self.messages.updated, Some(entity)))
    }

    /// Delete every matching record
    pub async fn remove(&self, condition: &Condition) -> CrudResult<Envelope<E>> {
        match self.store.delete(condition).await? {
            0 => Err(self.not_found()),
            _ => Ok(Envelope::new(self.messages.deleted, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::crud::Locale;
    use crate::products::{NewProduct, Product, ProductChanges};
    use crate::repository::{
        MemoryStore, RepositoryError, RepositoryOperation, RepositoryResult,
    };

    /// Wraps a [`MemoryStore`] and counts calls per operation
    #[derive(Clone, Default)]
    struct CountingStore {
        inner: MemoryStore<Product>,
        inserts: Arc<AtomicUsize>,
        lookups: Arc<AtomicUsize>,
    }

    impl EntityStore<Product> for CountingStore {
        async fn insert(&self, payload: &NewProduct) -> RepositoryResult<Product> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(payload).await
        }

        async fn find_one(
            &self,
            condition: &Condition,
            relations: &[String],
        ) -> RepositoryResult<Option<Product>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_one(condition, relations).await
        }

        async fn find_page(&self, query: &PageQuery) -> RepositoryResult<(Vec<Product>, u64)> {
            self.inner.find_page(query).await
        }

        async fn update(
            &self,
            condition: &Condition,
            changes: &ProductChanges,
        ) -> RepositoryResult<Vec<i64>> {
            self.inner.update(condition, changes).await
        }

        async fn delete(&self, condition: &Condition) -> RepositoryResult<u64> {
            self.inner.delete(condition).await
        }
    }

    /// Store whose every call fails
    struct BrokenStore;

    impl EntityStore<Product> for BrokenStore {
        async fn insert(&self, _: &NewProduct) -> RepositoryResult<Product> {
            Err(RepositoryError::connection_failed("connection reset"))
        }

        async fn find_one(&self, _: &Condition, _: &[String]) -> RepositoryResult<Option<Product>> {
            Err(RepositoryError::connection_failed("connection reset"))
        }

        async fn find_page(&self, _: &PageQuery) -> RepositoryResult<(Vec<Product>, u64)> {
            Err(RepositoryError::database_error(
                RepositoryOperation::FindPage,
                "relation does not exist",
            ))
        }

        async fn update(&self, _: &Condition, _: &ProductChanges) -> RepositoryResult<Vec<i64>> {
            Err(RepositoryError::connection_failed("connection reset"))
        }

        async fn delete(&self, _: &Condition) -> RepositoryResult<u64> {
            Err(RepositoryError::connection_failed("connection reset"))
        }
    }

    fn tv() -> NewProduct {
        NewProduct {
            name: "TV".to_string(),
            price: 1569.25,
            stock_quantity: 5,
        }
    }

    fn name_rule(name: &str) -> UniquenessRule {
        UniquenessRule::new(Condition::eq("name", name), "nome já cadastrado")
    }

    fn service() -> CrudService<Product, CountingStore> {
        CrudService::new(CountingStore::default(), Messages::default())
    }

    #[tokio::test]
    async fn test_create_returns_persisted_entity() {
        let service = service();
        let envelope = service.create(&tv(), false, &[]).await.unwrap();

        assert_eq!(envelope.message, vec!["Criado com sucesso."]);
        let product = envelope.data.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "TV");
        assert_eq!(product.price, 1569.25);
        assert_eq!(product.stock_quantity, 5);
    }

    #[tokio::test]
    async fn test_create_conflict_aborts_before_insert() {
        let service = service();
        service.create(&tv(), true, &[name_rule("TV")]).await.unwrap();

        let err = service
            .create(&tv(), true, &[name_rule("TV")])
            .await
            .unwrap_err();

        assert_eq!(err, CrudError::conflict("nome já cadastrado"));
        assert_eq!(service.store().inserts.load(Ordering::SeqCst), 1);
        assert_eq!(service.store().inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_checks_rules_in_order_and_stops_at_first_match() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();

        let rules = [
            UniquenessRule::new(Condition::eq("name", "Radio"), "first"),
            UniquenessRule::new(Condition::eq("name", "TV"), "second"),
            UniquenessRule::new(Condition::eq("id", 1_i64), "third"),
        ];
        let err = service.create(&tv(), true, &rules).await.unwrap_err();

        assert_eq!(err, CrudError::conflict("second"));
        assert_eq!(service.store().lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_skips_rules_when_not_enforced() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();
        service.create(&tv(), false, &[name_rule("TV")]).await.unwrap();

        assert_eq!(service.store().lookups.load(Ordering::SeqCst), 0);
        assert_eq!(service.store().inner.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_one_found_and_missing() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();

        let found = service
            .find_one(&Condition::eq("id", 1_i64), &[])
            .await
            .unwrap();
        assert_eq!(found.message, vec!["Consulta realizada com sucesso."]);

        let err = service
            .find_one(&Condition::eq("id", 2_i64), &[])
            .await
            .unwrap_err();
        assert_eq!(err, CrudError::not_found("Dados não encontrados."));
    }

    #[tokio::test]
    async fn test_find_all_on_empty_table() {
        let service = service();
        let mut params = FindAllParams::new("products");
        params.page = Some(1);
        params.per_page = Some(10);

        let envelope = service.find_all(params).await.unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.total, 0);
        assert_eq!(envelope.last_page, 0);
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.per_page, 10);
        assert_eq!(envelope.message, vec!["Consulta realizada com sucesso."]);
    }

    #[tokio::test]
    async fn test_find_all_defaults_and_page_beyond_end() {
        let service = service().with_default_per_page(2);
        for name in ["A", "B", "C"] {
            let payload = NewProduct {
                name: name.to_string(),
                ..tv()
            };
            service.create(&payload, false, &[]).await.unwrap();
        }

        let first = service.find_all(FindAllParams::new("products")).await.unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.per_page, 2);
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.last_page, 2);

        let mut beyond = FindAllParams::new("products");
        beyond.page = Some(5);
        let beyond = service.find_all(beyond).await.unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total, 3);
    }

    #[tokio::test]
    async fn test_find_all_drops_absent_filters_and_intersects_the_rest() {
        let service = service();
        for (name, price) in [("x", 15.0), ("x", 25.0), ("y", 15.0)] {
            let payload = NewProduct {
                name: name.to_string(),
                price,
                stock_quantity: 1,
            };
            service.create(&payload, false, &[]).await.unwrap();
        }

        let mut params = FindAllParams::new("products");
        params.condition_filters = vec![
            FilterCondition::eq_opt("name", Some("x")),
            None,
            FilterCondition::between_opt("price", Some(10.0_f64), Some(20.0_f64)),
        ];
        let envelope = service.find_all(params).await.unwrap();

        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.data[0].name, "x");
        assert_eq!(envelope.data[0].price, 15.0);
    }

    #[tokio::test]
    async fn test_find_all_page_zero_is_first_page() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();

        let mut params = FindAllParams::new("products");
        params.page = Some(0);
        let envelope = service.find_all(params).await.unwrap();
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.data.len(), 1);
    }

    #[tokio::test]
    async fn test_update_on_empty_table_is_not_found() {
        let service = service();
        let changes = ProductChanges {
            name: Some("Radio".to_string()),
            ..ProductChanges::default()
        };
        let err = service
            .update(&Condition::eq("id", 111_i64), &changes)
            .await
            .unwrap_err();
        assert_eq!(err, CrudError::not_found("Dados não encontrados."));
    }

    #[tokio::test]
    async fn test_update_returns_re_read_entity() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();

        let changes = ProductChanges {
            price: Some(999.99),
            ..ProductChanges::default()
        };
        let envelope = service
            .update(&Condition::eq("id", 1_i64), &changes)
            .await
            .unwrap();

        assert_eq!(envelope.message, vec!["Atualizado com sucesso."]);
        let product = envelope.data.unwrap();
        assert_eq!(product.price, 999.99);
        assert_eq!(product.name, "TV");
    }

    #[tokio::test]
    async fn test_remove() {
        let service = service();
        service.create(&tv(), false, &[]).await.unwrap();

        let envelope = service.remove(&Condition::eq("id", 1_i64)).await.unwrap();
        assert_eq!(envelope.message, vec!["Deletado com sucesso."]);
        assert!(envelope.data.is_none());

        let err = service
            .remove(&Condition::eq("id", 1_i64))
            .await
            .unwrap_err();
        assert!(matches!(err, CrudError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_backend_errors_propagate_unchanged() {
        let service = CrudService::new(BrokenStore, Messages::default());

        let err = service.create(&tv(), false, &[]).await.unwrap_err();
        assert_eq!(
            err,
            CrudError::Backend(RepositoryError::connection_failed("connection reset"))
        );

        let err = service
            .find_all(FindAllParams::new("products"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrudError::Backend(RepositoryError {
                operation: RepositoryOperation::FindPage,
                ..
            })
        ));

        let err = service.remove(&Condition::all()).await.unwrap_err();
        assert!(matches!(err, CrudError::Backend(_)));
    }

    #[tokio::test]
    async fn test_messages_follow_locale() {
        let service = CrudService::<Product, _>::new(
            MemoryStore::new(),
            Messages::for_locale(Locale::En),
        );
        let err = service
            .find_one(&Condition::eq("id", 1_i64), &[])
            .await
            .unwrap_err();
        assert_eq!(err, CrudError::not_found("Data not found."));
    }
}
