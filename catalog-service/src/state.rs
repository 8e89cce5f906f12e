//! Application state management

use std::sync::Arc;

#[cfg(feature = "postgres")]
use sqlx::PgPool;

use crate::{
    config::Config,
    crud::{CrudService, Messages},
    products::Product,
    repository::EntityStore,
};

/// Application state shared across handlers
///
/// Generic over the product store `S`, so the same router serves PostgreSQL
/// in production and the in-memory store in tests.
pub struct AppState<S> {
    config: Arc<Config>,
    products: CrudService<Product, S>,
    #[cfg(feature = "postgres")]
    db_pool: Option<PgPool>,
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            products: self.products.clone(),
            #[cfg(feature = "postgres")]
            db_pool: self.db_pool.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: EntityStore<Product>,
{
    /// Create state over `store`
    ///
    /// Messages follow `service.locale` and list pages default to
    /// `pagination.default_per_page`.
    pub fn new(config: Config, store: S) -> Self {
        let products = CrudService::new(store, Messages::for_locale(config.service.locale))
            .with_default_per_page(config.pagination.default_per_page);

        Self {
            config: Arc::new(config),
            products,
            #[cfg(feature = "postgres")]
            db_pool: None,
        }
    }

    /// Attach the database pool checked by the readiness probe
    #[cfg(feature = "postgres")]
    #[must_use]
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// CRUD service for products
    pub fn products(&self) -> &CrudService<Product, S> {
        &self.products
    }

    /// Message catalog for the configured locale
    pub fn messages(&self) -> &Messages {
        self.products.messages()
    }

    /// Get the database pool, if one is configured
    ///
    /// `PgPool` is reference-counted, so cloning is cheap.
    #[cfg(feature = "postgres")]
    pub fn db(&self) -> Option<PgPool> {
        self.db_pool.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::Locale;
    use crate::repository::MemoryStore;

    #[test]
    fn test_state_follows_config() {
        let mut config = Config::default();
        config.service.locale = Locale::En;
        let state = AppState::new(config, MemoryStore::<Product>::new());

        assert_eq!(state.messages().locale, Locale::En);
        assert_eq!(state.config().service.name, "catalog-service");
        #[cfg(feature = "postgres")]
        assert!(state.db().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let state = AppState::new(Config::default(), MemoryStore::<Product>::new());
        let clone = state.clone();

        let payload = crate::products::NewProduct {
            name: "TV".to_string(),
            price: 10.0,
            stock_quantity: 1,
        };
        clone.products().create(&payload, false, &[]).await.unwrap();

        assert_eq!(state.products().store().len().await, 1);
    }
}
