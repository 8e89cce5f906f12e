//! Failure taxonomy of the CRUD core

use crate::repository::RepositoryError;

/// Result type for CRUD operations
pub type CrudResult<T> = std::result::Result<T, CrudError>;

/// Ways a CRUD operation can fail
///
/// `Conflict` and `NotFound` are expected outcomes carrying a client-facing
/// message. `Backend` wraps whatever the store reported, unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrudError {
    /// A uniqueness rule matched an existing record
    #[error("conflict: {message}")]
    Conflict {
        /// The violated rule's message
        message: String,
    },

    /// The condition matched no record
    #[error("not found: {message}")]
    NotFound {
        /// Localized not-found message
        message: String,
    },

    /// The store failed
    #[error(transparent)]
    Backend(#[from] RepositoryError),
}

impl CrudError {
    /// Conflict carrying `message`
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Not-found carrying `message`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            CrudError::conflict("nome já cadastrado").to_string(),
            "conflict: nome já cadastrado"
        );
        assert_eq!(
            CrudError::not_found("Dados não encontrados.").to_string(),
            "not found: Dados não encontrados."
        );
    }

    #[test]
    fn test_backend_is_transparent() {
        let repo = RepositoryError::connection_failed("refused");
        let err = CrudError::from(repo.clone());
        assert_eq!(err.to_string(), repo.to_string());
        assert_eq!(err, CrudError::Backend(repo));
    }
}
