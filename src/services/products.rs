use crate::domain::product::NewProduct;
use crate::domain::types::ProductId;
use crate::dto::records::{IntoRecord, Record, into_records};
use crate::forms::products::{AddProductForm, ProductFilter, ProductSearchQuery, SliceQuery};
use crate::repository::{ProductReader, ProductWriter, RepositoryError};

use super::{DeleteMode, ServiceError, ServiceResult, log_failure};

/// Creates a fully described product under the listing named in the form.
///
/// Returns the new product rendered as a record. An unknown parent listing is
/// reported as [`ServiceError::NotFound`].
pub fn create_product<R>(form: AddProductForm, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: ProductReader + ProductWriter,
{
    let product = NewProduct::try_from(form).map_err(|e| {
        log::warn!("Rejected product form: {e}");
        ServiceError::InvalidInput(e.to_string())
    })?;

    let id = match repo.create_product(&product) {
        Ok(id) => id,
        Err(RepositoryError::NotFound) => {
            log::warn!("No subcategory named {}", product.stub.parent_name);
            return Err(ServiceError::NotFound);
        }
        Err(e) => return Err(log_failure("create product", e)),
    };

    let created = repo
        .get_product_by_id(id)
        .map_err(|e| log_failure("get created product", e))?;

    Ok(created.into_iter().map(IntoRecord::into_record).collect())
}

pub fn show_product<R>(id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: ProductReader,
{
    let Ok(id) = ProductId::new(id) else {
        return Ok(Vec::new());
    };

    let product = repo
        .get_product_by_id(id)
        .map_err(|e| log_failure("get product", e))?;

    Ok(product.into_iter().map(IntoRecord::into_record).collect())
}

/// Products with ids in `[lo, hi]`, optionally sliced afterwards.
pub fn show_products_interval<R>(
    lo: i32,
    hi: i32,
    slice: SliceQuery,
    repo: &R,
) -> ServiceResult<Vec<Record>>
where
    R: ProductReader,
{
    let mut products = repo
        .get_products_interval(lo, hi)
        .map_err(|e| log_failure("get product interval", e))?;

    if let Some(pagination) = slice.pagination() {
        products = pagination.apply(products);
    }

    Ok(into_records(products))
}

pub fn show_product_properties<R>(product_id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: ProductReader,
{
    let Ok(product_id) = ProductId::new(product_id) else {
        return Ok(Vec::new());
    };

    let properties = repo
        .get_product_properties(product_id)
        .map_err(|e| log_failure("get product properties", e))?;

    Ok(into_records(properties))
}

/// One record per live property, carrying the product columns alongside.
pub fn show_product_with_properties<R>(product_id: i32, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: ProductReader,
{
    let Ok(product_id) = ProductId::new(product_id) else {
        return Ok(Vec::new());
    };

    let rows = repo
        .get_product_with_properties(product_id)
        .map_err(|e| log_failure("get product with properties", e))?;

    Ok(into_records(rows))
}

/// Name search when `name` is given, otherwise an inclusive price range.
pub fn search_products<R>(query: ProductSearchQuery, repo: &R) -> ServiceResult<Vec<Record>>
where
    R: ProductReader,
{
    let filter =
        ProductFilter::try_from(query).map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    let products = match filter {
        ProductFilter::Name(text) => repo.get_products_by_name_substring(&text),
        ProductFilter::PriceRange(lo, hi) => repo.get_products_by_price_range(lo, hi),
        ProductFilter::Unsatisfiable => return Ok(Vec::new()),
    }
    .map_err(|e| log_failure("search products", e))?;

    Ok(into_records(products))
}

/// Deletes a product. Returns `false` when nothing was removed.
pub fn delete_product<R>(id: i32, mode: DeleteMode, repo: &R) -> ServiceResult<bool>
where
    R: ProductWriter,
{
    let Ok(id) = ProductId::new(id) else {
        return Ok(false);
    };

    let affected = match mode {
        DeleteMode::Soft => repo.soft_delete_product(id),
        DeleteMode::Hard => repo.hard_delete_product(id, false),
        DeleteMode::HardCascade => repo.hard_delete_product(id, true),
    }
    .map_err(|e| log_failure("delete product", e))?;

    Ok(affected > 0)
}
