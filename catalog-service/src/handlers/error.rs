//! API error types for handler operations
//!
//! [`ApiError`] maps validation failures and [`CrudError`]s to HTTP status codes.
//! The response body is always an envelope with `data: null`.
//!
//! # Example
//!
//! ```rust
//! use catalog_service::crud::{CrudError, Messages};
//! use catalog_service::handlers::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::from_crud(
//!     CrudError::not_found("Dados não encontrados."),
//!     ApiOperation::Get,
//!     &Messages::default(),
//! );
//! assert_eq!(error.kind, ApiErrorKind::NotFound);
//! ```

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::crud::{CrudError, Envelope, Messages};
use crate::repository::RepositoryError;

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Getting a single entity by ID
    Get,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Malformed or out-of-range input
    ValidationFailed,
    /// Condition matched nothing
    NotFound,
    /// Uniqueness rule violated
    Conflict,
    /// Backend failure
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing messages, in order
    pub messages: Vec<String>,
    /// Underlying backend failure; logged, never sent to the client
    pub source: Option<RepositoryError>,
}

impl ApiError {
    /// Create a new API error with one message
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            messages: vec![message.into()],
            source: None,
        }
    }

    /// Validation failure carrying every violated rule
    pub fn validation(operation: ApiOperation, messages: Vec<String>) -> Self {
        Self {
            operation,
            kind: ApiErrorKind::ValidationFailed,
            messages,
            source: None,
        }
    }

    /// Request body that could not be read as JSON
    pub fn malformed_body(operation: ApiOperation, rejection: &JsonRejection) -> Self {
        tracing::debug!(%operation, "rejected request body: {}", rejection.body_text());
        Self::new(
            operation,
            ApiErrorKind::ValidationFailed,
            "Corpo da requisição deve ser um JSON válido",
        )
    }

    /// Query string that could not be decoded
    pub fn malformed_query(operation: ApiOperation, rejection: &QueryRejection) -> Self {
        tracing::debug!(%operation, "rejected query string: {}", rejection.body_text());
        Self::new(
            operation,
            ApiErrorKind::ValidationFailed,
            "Parâmetros de consulta inválidos",
        )
    }

    /// Map a CRUD failure; backend details are replaced by the localized
    /// internal-error message
    pub fn from_crud(err: CrudError, operation: ApiOperation, messages: &Messages) -> Self {
        match err {
            CrudError::Conflict { message } => {
                Self::new(operation, ApiErrorKind::Conflict, message)
            }
            CrudError::NotFound { message } => {
                Self::new(operation, ApiErrorKind::NotFound, message)
            }
            CrudError::Backend(source) => Self {
                operation,
                kind: ApiErrorKind::InternalError,
                messages: vec![messages.internal_error.to_string()],
                source: Some(source),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind,
            self.operation,
            self.messages.join("; ")
        )?;
        if let Some(ref source) = self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        match &self.source {
            Some(source) => tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                backend_operation = %source.operation,
                backend_kind = %source.kind,
                entity_type = ?source.entity_type,
                "API error: {}", source.message
            ),
            None => tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                "API error: {}", self.messages.join("; ")
            ),
        }

        let body: Envelope<()> = Envelope::messages(self.messages);
        (status, Json(body)).into_response()
    }
}
