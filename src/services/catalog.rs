use crate::domain::CatalogTable;
use crate::dto::records::{IntoRecord, Record};
use crate::repository::CatalogReader;

use super::{ServiceError, ServiceResult, log_failure};

/// Point lookup of any catalog row by table name and id.
///
/// Unknown table names are rejected as invalid input; a missing row yields an
/// empty vector.
pub fn show_entry<R>(table_name: &str, id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: CatalogReader,
{
    let table = CatalogTable::try_from(table_name)
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let entry = repo
        .get_by_id(table, id)
        .map_err(|e| log_failure("get catalog entry", e))?;

    Ok(entry.into_iter().map(IntoRecord::into_record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::types::{CategoryId, CategoryName};
    use crate::repository::test::TestRepository;

    fn repo() -> TestRepository {
        TestRepository::new(
            vec![Category {
                id: CategoryId::new(1).unwrap(),
                name: CategoryName::new("Shoes").unwrap(),
                deleted_at: None,
            }],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn returns_rendered_row() {
        let records = show_entry("categories", 1, &repo()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some("Shoes"));
    }

    #[test]
    fn missing_row_is_empty() {
        assert!(show_entry("products", 1, &repo()).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_table() {
        let err = show_entry("users", 1, &repo()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn repository_failure_is_internal() {
        let err = show_entry("categories", 1, &TestRepository::unavailable()).unwrap_err();
        assert_eq!(err, ServiceError::Internal);
    }
}
