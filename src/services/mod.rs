//! Entry points for callers that want rendered records instead of typed rows.
//!
//! Every function is generic over the repository traits so it can run against
//! [`DieselRepository`](crate::repository::DieselRepository) or the in-memory
//! test repository.

use crate::repository::RepositoryError;

pub mod catalog;
pub mod categories;
pub mod errors;
pub mod products;

pub use errors::{ServiceError, ServiceResult};

/// How a delete request removes rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Stamp `deleted_at` on the row and its children.
    #[default]
    Soft,
    /// Physically delete; refused while children reference the row.
    Hard,
    /// Physically delete the row after its children.
    HardCascade,
}

/// Logs `err` in the context of `action` and converts it for the caller.
fn log_failure(action: &str, err: RepositoryError) -> ServiceError {
    match &err {
        RepositoryError::NotFound
        | RepositoryError::IntegrityError(_)
        | RepositoryError::LeaseLost(_) => {
            log::warn!("Failed to {action}: {err}");
        }
        _ => log::error!("Failed to {action}: {err}"),
    }
    ServiceError::from(err)
}
