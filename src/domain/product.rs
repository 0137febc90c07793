use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CRAWL_ERROR_SENTINEL, ImageUrl, ProductDescription, ProductId, ProductName, ProductPrice,
    ProductPropertyId, ProductUnits, ProductUrl, PropertyName, SubcategoryLvl2Id,
    SubcategoryName, WorkerId,
};

/// A product discovered on a subcategory listing.
///
/// Enrichment fields stay `None` while the product is a stub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub url: ProductUrl,
    pub name: Option<ProductName>,
    pub price: Option<ProductPrice>,
    pub units: Option<ProductUnits>,
    pub description: Option<ProductDescription>,
    pub image_url: Option<ImageUrl>,
    pub is_trend: Option<bool>,
    pub parsed_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
    pub subcat_lvl2_id: SubcategoryLvl2Id,
    pub claimed_by: Option<WorkerId>,
    pub claim_expires_at: Option<NaiveDateTime>,
}

impl Product {
    /// Whether the crawler visited the page but recorded the error sentinel.
    pub fn is_crawl_error(&self) -> bool {
        self.parsed_at.is_some()
            && self
                .name
                .as_ref()
                .is_some_and(|name| name.as_str() == CRAWL_ERROR_SENTINEL)
    }
}

/// A product known only by its URL and the listing it was found on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProductStub {
    pub url: ProductUrl,
    /// Name of the parent second-level subcategory.
    pub parent_name: SubcategoryName,
}

/// Fields filled in once a product page has been parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductEnrichment {
    pub name: ProductName,
    pub price: Option<ProductPrice>,
    pub units: Option<ProductUnits>,
    pub description: Option<ProductDescription>,
    pub image_url: Option<ImageUrl>,
    pub is_trend: Option<bool>,
}

impl ProductEnrichment {
    /// Sentinel enrichment marking a page that was visited but yielded no data.
    pub fn crawl_error() -> Self {
        Self {
            name: ProductName::crawl_error(),
            price: None,
            units: None,
            description: Some(ProductDescription::crawl_error()),
            image_url: None,
            is_trend: None,
        }
    }
}

/// A fully described product created in one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub stub: NewProductStub,
    pub enrichment: ProductEnrichment,
}

/// A name/value characteristic attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductProperty {
    pub id: ProductPropertyId,
    pub name: PropertyName,
    pub value: String,
    pub product_id: ProductId,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Data required to insert a new [`ProductProperty`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProductProperty {
    pub name: PropertyName,
    pub value: String,
    pub product_id: ProductId,
}
