use diesel::prelude::*;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductProperty};
use crate::domain::subcategory::{SubcategoryLvl1, SubcategoryLvl2};
use crate::domain::{CatalogEntry, CatalogTable};
use crate::models::category::Category as DbCategory;
use crate::models::product::{Product as DbProduct, ProductProperty as DbProductProperty};
use crate::models::subcategory::{
    SubcategoryLvl1 as DbSubcategoryLvl1, SubcategoryLvl2 as DbSubcategoryLvl2,
};
use crate::repository::{CatalogReader, DieselRepository, RepositoryResult};

impl CatalogReader for DieselRepository {
    fn get_by_id(&self, table: CatalogTable, id: i32) -> RepositoryResult<Option<CatalogEntry>> {
        use crate::schema::{
            categories, product_properties, products, subcategories_lvl1, subcategories_lvl2,
        };

        let mut conn = self.conn()?;

        let entry = match table {
            CatalogTable::Categories => categories::table
                .filter(categories::id.eq(id))
                .filter(categories::deleted_at.is_null())
                .first::<DbCategory>(&mut conn)
                .optional()?
                .map(|row| Category::try_from(row).map(CatalogEntry::Category))
                .transpose()?,
            CatalogTable::SubcategoriesLvl1 => subcategories_lvl1::table
                .filter(subcategories_lvl1::id.eq(id))
                .filter(subcategories_lvl1::deleted_at.is_null())
                .first::<DbSubcategoryLvl1>(&mut conn)
                .optional()?
                .map(|row| SubcategoryLvl1::try_from(row).map(CatalogEntry::SubcategoryLvl1))
                .transpose()?,
            // Second-level subcategories are never soft-deleted.
            CatalogTable::SubcategoriesLvl2 => subcategories_lvl2::table
                .filter(subcategories_lvl2::id.eq(id))
                .first::<DbSubcategoryLvl2>(&mut conn)
                .optional()?
                .map(|row| SubcategoryLvl2::try_from(row).map(CatalogEntry::SubcategoryLvl2))
                .transpose()?,
            CatalogTable::Products => products::table
                .filter(products::id.eq(id))
                .filter(products::deleted_at.is_null())
                .first::<DbProduct>(&mut conn)
                .optional()?
                .map(|row| Product::try_from(row).map(CatalogEntry::Product))
                .transpose()?,
            CatalogTable::ProductProperties => product_properties::table
                .filter(product_properties::id.eq(id))
                .filter(product_properties::deleted_at.is_null())
                .first::<DbProductProperty>(&mut conn)
                .optional()?
                .map(|row| ProductProperty::try_from(row).map(CatalogEntry::ProductProperty))
                .transpose()?,
        };

        Ok(entry)
    }
}
