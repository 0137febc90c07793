use crate::domain::types::CategoryId;
use crate::dto::records::{IntoRecord, Record, into_records};
use crate::forms::products::SliceQuery;
use crate::repository::{CategoryReader, CategoryWriter};

use super::{DeleteMode, ServiceError, ServiceResult, log_failure};

pub fn show_category<R>(id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: CategoryReader,
{
    let Ok(id) = CategoryId::new(id) else {
        return Ok(Vec::new());
    };

    let category = repo
        .get_category(id)
        .map_err(|e| log_failure("get category", e))?;

    Ok(category.into_iter().map(IntoRecord::into_record).collect())
}

/// Categories with ids in `[lo, hi]`, optionally sliced afterwards.
pub fn show_category_interval<R>(
    lo: i32,
    hi: i32,
    slice: SliceQuery,
    repo: &R,
) -> ServiceResult<Vec<Record>>
where
    R: CategoryReader,
{
    let mut categories = repo
        .get_category_interval(lo, hi)
        .map_err(|e| log_failure("get category interval", e))?;

    if let Some(pagination) = slice.pagination() {
        categories = pagination.apply(categories);
    }

    Ok(into_records(categories))
}

pub fn show_subcategories_lvl1<R>(category_id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: CategoryReader,
{
    let Ok(category_id) = CategoryId::new(category_id) else {
        return Ok(Vec::new());
    };

    let subcategories = repo
        .get_subcategories_lvl1(category_id)
        .map_err(|e| log_failure("get subcategories", e))?;

    Ok(into_records(subcategories))
}

/// Deletes a category. Returns `false` when nothing was removed.
///
/// Categories have no cascading hard delete: their subcategories must be
/// removed first.
pub fn delete_category<R>(id: i32, mode: DeleteMode, repo: &R) -> ServiceResult<bool>
where
    R: CategoryWriter,
{
    let Ok(id) = CategoryId::new(id) else {
        return Ok(false);
    };

    let affected = match mode {
        DeleteMode::Soft => repo.soft_delete_category(id),
        DeleteMode::Hard => repo.hard_delete_category(id),
        DeleteMode::HardCascade => {
            return Err(ServiceError::InvalidInput(
                "categories cannot be hard-deleted with cascade".into(),
            ));
        }
    }
    .map_err(|e| log_failure("delete category", e))?;

    Ok(affected > 0)
}
