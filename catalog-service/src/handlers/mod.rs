//! HTTP-facing types shared by resource routers
//!
//! - [`ApiError`]: maps validation failures and CRUD errors to status codes
//!   with an envelope body
//! - [`Created`] and [`NoContent`]: 201 and 204 responses
//! - [`ListQuery`]: page, page size and ordering parameters
//!
//! Envelopes returned by the CRUD core respond with 200 directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::extract::{Path, State};
//! use catalog_service::handlers::{ApiError, ApiOperation};
//!
//! async fn get_product(
//!     State(state): State<AppState<S>>,
//!     Path(id): Path<String>,
//! ) -> Result<impl IntoResponse, ApiError> {
//!     let id = parse_id(&id, ApiOperation::Get)?;
//!     state
//!         .products()
//!         .find_one(&Condition::eq("id", id), &[])
//!         .await
//!         .map_err(|e| ApiError::from_crud(e, ApiOperation::Get, state.products().messages()))
//! }
//! ```

mod error;
mod query;
mod response;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use query::{ListQuery, ListRequest};
pub use response::{Created, NoContent};
