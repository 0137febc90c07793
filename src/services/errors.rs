use thiserror::Error;

use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The write would break referential integrity or uniqueness.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Caller supplied malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::IntegrityError(message) => Self::Conflict(message),
            RepositoryError::LeaseLost(worker) => Self::Conflict(format!("leased to {worker}")),
            RepositoryError::ValidationError(message) => Self::InvalidInput(message),
            RepositoryError::ConnectionError(_)
            | RepositoryError::Migration(_)
            | RepositoryError::DatabaseError(_) => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_errors_become_conflicts() {
        let err = ServiceError::from(RepositoryError::IntegrityError("fk".into()));
        assert_eq!(err, ServiceError::Conflict("fk".into()));
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let err = ServiceError::from(RepositoryError::ConnectionError("down".into()));
        assert_eq!(err, ServiceError::Internal);
    }
}
