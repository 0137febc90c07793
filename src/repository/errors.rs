use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The database could not be reached or a pooled connection was unavailable.
    #[error("connection error: {0}")]
    ConnectionError(String),
    /// A foreign-key, uniqueness or liveness constraint rejected the write.
    #[error("integrity error: {0}")]
    IntegrityError(String),
    /// A point operation targeted a row that does not exist.
    #[error("not found")]
    NotFound,
    /// Stored or supplied data failed a domain constraint.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// Another worker holds the crawl lease on the row.
    #[error("row is leased to {0}")]
    LeaseLost(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}

/// Convenient alias for repository results.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::IntegrityError(info.message().to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                Self::ConnectionError(info.message().to_string())
            }
            // SQLite reports foreign-key failures without a specific kind.
            DieselError::DatabaseError(_, info)
                if info.message().contains("FOREIGN KEY constraint failed") =>
            {
                Self::IntegrityError(info.message().to_string())
            }
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        Self::ConnectionError(value.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(value: TypeConstraintError) -> Self {
        Self::ValidationError(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_missing_rows_to_not_found() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn maps_sqlite_foreign_key_failures_to_integrity_errors() {
        let err = RepositoryError::from(DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("FOREIGN KEY constraint failed".to_string()),
        ));
        assert!(matches!(err, RepositoryError::IntegrityError(_)));
    }

    #[test]
    fn keeps_other_database_failures_generic() {
        let err = RepositoryError::from(DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("disk I/O error".to_string()),
        ));
        assert!(matches!(err, RepositoryError::DatabaseError(_)));
    }

    #[test]
    fn maps_type_constraints_to_validation_errors() {
        let err = RepositoryError::from(TypeConstraintError::EmptyString("category name"));
        assert_eq!(err.to_string(), "validation error: category name cannot be empty");
    }
}
