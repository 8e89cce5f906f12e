//! Generic CRUD core
//!
//! Every product operation funnels through [`CrudService`], which composes
//! filters, applies pagination, enforces existence and uniqueness, and wraps
//! results in an [`Envelope`] or [`PageEnvelope`] with localized [`Messages`].
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_service::crud::{CrudService, Messages, UniquenessRule};
//! use catalog_service::repository::{Condition, MemoryStore};
//!
//! let service = CrudService::new(MemoryStore::new(), Messages::default());
//! let created = service
//!     .create(
//!         &payload,
//!         true,
//!         &[UniquenessRule::new(Condition::eq("name", "TV"), "name taken")],
//!     )
//!     .await?;
//! ```

mod envelope;
mod error;
mod messages;
mod service;

pub use envelope::{Envelope, PageEnvelope};
pub use error::{CrudError, CrudResult};
pub use messages::{Locale, Messages};
pub use service::{CrudService, FindAllParams, UniquenessRule};
