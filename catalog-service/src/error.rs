//! Service-level errors
//!
//! Request handling has its own error types ([`crate::handlers::ApiError`],
//! [`crate::crud::CrudError`]). [`Error`] covers startup and infrastructure:
//! loading configuration, connecting to the database, binding the listener.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using the service [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Startup and infrastructure failures
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Database error with operation context
    #[error("{0}")]
    Database(RepositoryError),

    /// Schema migration failed
    #[cfg(feature = "postgres")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        Error::Database(err)
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_database_error_display_keeps_context() {
        let err: Error = RepositoryError::connection_failed("refused")
            .with_operation(RepositoryOperation::Connect)
            .into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        assert_eq!(err.to_string(), "I/O error: port taken");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = figment::Error::from("missing field `port`".to_string()).into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
