//! Repository error types
//!
//! Every failure raised by an [`EntityStore`](super::EntityStore) backend is a
//! [`RepositoryError`]. The CRUD core never inspects these beyond wrapping them,
//! so they reach the HTTP layer unchanged.
//!
//! # Example
//!
//! ```rust
//! use catalog_service::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::validation_failed(RepositoryOperation::FindPage, "unknown column 'colour'");
//! assert!(matches!(error.kind, RepositoryErrorKind::ValidationFailed));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Inserting a new record
    Insert,
    /// Looking up a single record by condition
    FindOne,
    /// Fetching a filtered, ordered page of records together with the total count
    FindPage,
    /// Applying a partial update to matching records
    Update,
    /// Removing matching records
    Delete,
    /// Establishing a connection or acquiring one from the pool
    Connect,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::FindOne => write!(f, "find_one"),
            Self::FindPage => write!(f, "find_page"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Connect => write!(f, "connect"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity already exists (duplicate key)
    AlreadyExists,
    /// Database constraint violation (unique, foreign key, check)
    ConstraintViolation,
    /// The request named a column, relation or alias the entity does not declare
    ValidationFailed,
    /// Failed to connect to the database
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Underlying database error
    DatabaseError,
    /// A row could not be decoded into the entity type
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Product")
    pub entity_type: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
        }
    }

    /// Create a validation failed error
    ///
    /// Raised when a query references something the entity does not declare.
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Connect,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Attach the entity type to an existing error
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(entity_type) = &self.entity_type {
            write!(f, " [{}]", entity_type)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error as E;

        // The operation is unknown here; callers refine it with `with_operation`.
        let operation = RepositoryOperation::FindOne;
        match err {
            E::PoolTimedOut => Self::new(
                RepositoryOperation::Connect,
                RepositoryErrorKind::Timeout,
                "Connection pool timed out",
            ),
            E::PoolClosed => Self::connection_failed("Connection pool is closed"),
            E::WorkerCrashed => Self::connection_failed("Database worker crashed"),
            E::Io(e) => Self::connection_failed(e.to_string()),
            E::Tls(e) => Self::connection_failed(format!("TLS error: {}", e)),
            E::Configuration(e) => Self::new(
                RepositoryOperation::Connect,
                RepositoryErrorKind::ConnectionFailed,
                e.to_string(),
            ),
            E::ColumnNotFound(col) => {
                Self::database_error(operation, format!("Column not found: {}", col))
            }
            E::ColumnDecode { index, source } => Self::new(
                operation,
                RepositoryErrorKind::SerializationError,
                format!("Failed to decode column {}: {}", index, source),
            ),
            E::Decode(e) => Self::new(
                operation,
                RepositoryErrorKind::SerializationError,
                e.to_string(),
            ),
            E::Database(db_err) => {
                let kind = if db_err.is_unique_violation() {
                    RepositoryErrorKind::AlreadyExists
                } else if db_err.is_foreign_key_violation()
                    || db_err.is_check_violation()
                {
                    RepositoryErrorKind::ConstraintViolation
                } else {
                    RepositoryErrorKind::DatabaseError
                };
                Self::new(operation, kind, db_err.to_string())
            }
            other => Self::new(operation, RepositoryErrorKind::Other, other.to_string()),
        }
    }
}
