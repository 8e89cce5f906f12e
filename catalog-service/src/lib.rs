//! # catalog-service
//!
//! Product catalog REST service built on a generic CRUD core.
//!
//! ## Layers
//!
//! - [`repository`]: storage capability ([`EntityStore`](repository::EntityStore)),
//!   filters, pagination, PostgreSQL and in-memory backends
//! - [`crud`]: the generic CRUD service, envelopes and localized messages
//! - [`handlers`]: HTTP error mapping and response types
//! - [`products`]: the `/products` resource
//! - [`config`], [`observability`], [`server`], [`state`], [`health`]: the service around it
//! - `openapi` (feature `openapi`): OpenAPI document and Swagger UI
//!
//! ## Example
//!
//! ```rust,no_run
//! use catalog_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone(), MemoryStore::<Product>::new());
//!     Server::new(config).serve(build_app(state)).await
//! }
//! ```

pub mod config;
pub mod crud;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod products;
pub mod repository;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, LogFormat, PaginationConfig};
    pub use crate::crud::{CrudService, Envelope, Locale, Messages, PageEnvelope};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{MakeTypedRequestId, RequestId};
    pub use crate::observability::init_tracing;
    pub use crate::products::{NewProduct, Product, ProductChanges};
    pub use crate::repository::{Condition, EntityStore, FilterCondition, MemoryStore};
    #[cfg(feature = "postgres")]
    pub use crate::repository::PgStore;
    pub use crate::server::{build_app, Server};
    pub use crate::state::AppState;
}
