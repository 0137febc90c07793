//! Catalog entities and the value types they are built from.

pub mod category;
pub mod crawl;
pub mod product;
pub mod subcategory;
pub mod types;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductProperty};
use crate::domain::subcategory::{SubcategoryLvl1, SubcategoryLvl2};

/// The five catalog tables addressable by a generic point lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogTable {
    Categories,
    SubcategoriesLvl1,
    SubcategoriesLvl2,
    Products,
    ProductProperties,
}

impl CatalogTable {
    /// Table name as stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::SubcategoriesLvl1 => "subcategories_lvl1",
            Self::SubcategoriesLvl2 => "subcategories_lvl2",
            Self::Products => "products",
            Self::ProductProperties => "product_properties",
        }
    }
}

impl TryFrom<&str> for CatalogTable {
    type Error = types::TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "categories" => Ok(Self::Categories),
            "subcategories_lvl1" => Ok(Self::SubcategoriesLvl1),
            "subcategories_lvl2" => Ok(Self::SubcategoriesLvl2),
            "products" => Ok(Self::Products),
            "product_properties" => Ok(Self::ProductProperties),
            other => Err(types::TypeConstraintError::InvalidValue(format!(
                "catalog table: {other}"
            ))),
        }
    }
}

/// A row returned by a generic point lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Category(Category),
    SubcategoryLvl1(SubcategoryLvl1),
    SubcategoryLvl2(SubcategoryLvl2),
    Product(Product),
    ProductProperty(ProductProperty),
}
