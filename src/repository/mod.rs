use chrono::{NaiveDateTime, SubsecRound, Utc};

use crate::db::{DbConnection, DbPool};
use crate::domain::category::Category;
use crate::domain::crawl::{ClaimedProduct, ClaimedSubcategory, CrawlLease};
use crate::domain::product::{
    NewProduct, NewProductProperty, NewProductStub, Product, ProductEnrichment, ProductProperty,
};
use crate::domain::subcategory::{NewSubcategoryLvl2, SubcategoryLvl1};
use crate::domain::types::{
    CategoryId, CategoryName, ProductId, ProductPrice, ProductPropertyId, SubcategoryLvl1Id,
    SubcategoryLvl2Id, SubcategoryName,
};
use crate::domain::{CatalogEntry, CatalogTable};

pub mod catalog;
pub mod category;
pub mod crawl_state;
pub mod errors;
pub mod product;
pub mod schema_manager;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be handed to every crawler worker; each clone may carry its own lease.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
    lease: CrawlLease,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            lease: CrawlLease::default(),
        }
    }

    /// Use `lease` for claims made through this repository.
    pub fn with_lease(mut self, lease: CrawlLease) -> Self {
        self.lease = lease;
        self
    }

    pub fn lease(&self) -> &CrawlLease {
        &self.lease
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Current UTC wall clock truncated to whole seconds.
pub(crate) fn current_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

/// Offset/limit window applied to an already fetched result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Returns the window of `items`; out-of-range offsets yield nothing.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// Generic point lookup over every catalog table.
pub trait CatalogReader {
    /// Fetch a live row of `table` by id.
    fn get_by_id(&self, table: CatalogTable, id: i32) -> RepositoryResult<Option<CatalogEntry>>;
}

/// Read-only operations for categories and their first-level children.
pub trait CategoryReader {
    /// Retrieve a live category by its identifier.
    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Live categories with `lo <= id <= hi`, ordered by id. Empty when `hi < lo`.
    fn get_category_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Category>>;
    /// Live first-level subcategories of a category.
    fn get_subcategories_lvl1(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<SubcategoryLvl1>>;
}

/// Write operations for the category side of the hierarchy.
pub trait CategoryWriter {
    fn insert_category(&self, name: &CategoryName) -> RepositoryResult<CategoryId>;
    /// Fails with [`RepositoryError::IntegrityError`] unless the category is live.
    fn insert_subcategory_lvl1(
        &self,
        name: &SubcategoryName,
        category_id: CategoryId,
    ) -> RepositoryResult<SubcategoryLvl1Id>;
    /// Inserts an unparsed listing. Fails unless the parent is live.
    fn insert_subcategory_lvl2(
        &self,
        subcategory: &NewSubcategoryLvl2,
        parent_id: SubcategoryLvl1Id,
    ) -> RepositoryResult<SubcategoryLvl2Id>;
    /// Soft-delete a category together with its first-level subcategories.
    fn soft_delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
    /// Physically delete a category; refused while subcategories reference it.
    fn hard_delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for products and their properties.
pub trait ProductReader {
    /// Retrieve a live product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Live products with `lo <= id <= hi`, ordered by id. Empty when `hi < lo`.
    fn get_products_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Product>>;
    /// Live products priced within `[lo, hi]`.
    fn get_products_by_price_range(
        &self,
        lo: ProductPrice,
        hi: ProductPrice,
    ) -> RepositoryResult<Vec<Product>>;
    /// Live products whose name contains `text` (case-sensitive).
    fn get_products_by_name_substring(&self, text: &str) -> RepositoryResult<Vec<Product>>;
    /// Live properties of a product.
    fn get_product_properties(&self, product_id: ProductId)
    -> RepositoryResult<Vec<ProductProperty>>;
    /// The product joined with each of its live properties.
    fn get_product_with_properties(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<(Product, ProductProperty)>>;
}

/// Write operations for products and their properties.
pub trait ProductWriter {
    /// Insert a product known only by URL under the listing named `parent_name`.
    fn insert_product_stub(&self, stub: &NewProductStub) -> RepositoryResult<ProductId>;
    /// Write enrichment fields and stamp `parsed_at`.
    fn update_product(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<usize>;
    /// Insert a stub and enrich it in one transaction.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId>;
    fn insert_product_property(
        &self,
        property: &NewProductProperty,
    ) -> RepositoryResult<ProductPropertyId>;
    /// Soft-delete a product together with its properties.
    fn soft_delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
    /// Physically delete a product; with `cascade` its properties go first.
    fn hard_delete_product(&self, id: ProductId, cascade: bool) -> RepositoryResult<usize>;
}

/// Read-only view of crawl progress.
pub trait CrawlStateReader {
    /// True when no second-level subcategory is waiting to be crawled.
    fn all_subcategories_parsed(&self) -> RepositoryResult<bool>;
    /// True when no live product is waiting to be crawled.
    fn all_products_parsed(&self) -> RepositoryResult<bool>;
    /// True when at least `n` second-level subcategories exist.
    fn subcategory_count_at_least(&self, n: i64) -> RepositoryResult<bool>;
}

/// Claiming and completing crawl work.
pub trait CrawlStateWriter {
    /// Lease one unparsed listing to this worker, or `None` when nothing is available.
    fn claim_next_unparsed_subcategory(&self) -> RepositoryResult<Option<ClaimedSubcategory>>;
    /// Stamp `parsed_at` on a listing. Repeated calls are no-ops; a listing
    /// leased to another worker fails with [`RepositoryError::LeaseLost`].
    fn mark_subcategory_parsed(&self, id: SubcategoryLvl2Id) -> RepositoryResult<()>;
    /// Lease one unparsed product to this worker, or `None` when nothing is available.
    fn claim_next_unparsed_product(&self) -> RepositoryResult<Option<ClaimedProduct>>;
    /// Write the parsed fields of a product held by this worker or by nobody.
    /// Already parsed products are left as they are.
    fn mark_product_parsed(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<()>;
    /// Record that the product page was visited but could not be parsed.
    /// Same lease rules as [`CrawlStateWriter::mark_product_parsed`].
    fn mark_product_error(&self, id: ProductId) -> RepositoryResult<()>;
}

/// Creation and removal of the catalog schema.
pub trait SchemaManager {
    /// Create all catalog tables. Re-running is a no-op.
    fn create_schema(&self) -> RepositoryResult<()>;
    /// Drop all catalog tables together.
    fn drop_schema(&self) -> RepositoryResult<()>;
    /// Names of the catalog tables present in the database.
    fn list_tables(&self) -> RepositoryResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_slices_after_fetch() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(Pagination::new(1, 2).apply(items.clone()), vec![2, 3]);
        assert_eq!(Pagination::new(4, 10).apply(items.clone()), vec![5]);
        assert!(Pagination::new(9, 1).apply(items).is_empty());
    }

    #[test]
    fn timestamps_have_second_granularity() {
        use chrono::Timelike;
        assert_eq!(current_timestamp().nanosecond(), 0);
    }
}
