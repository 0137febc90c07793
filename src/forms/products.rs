use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, NewProductStub, ProductEnrichment};
use crate::domain::types::{
    ImageUrl, ProductDescription, ProductName, ProductPrice, ProductUnits, ProductUrl,
    SubcategoryName, TypeConstraintError,
};
use crate::repository::Pagination;

/// Payload for creating a fully described product.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    /// Name of the second-level subcategory the product belongs to.
    #[validate(length(min = 1))]
    pub parent: String,
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub product_units: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub is_trend: Option<bool>,
}

#[derive(Debug, Error)]
pub enum AddProductFormError {
    #[error("Add product form validation failed: {0}")]
    Validation(String),
    #[error("Add product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Blank optional strings are treated as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<AddProductForm> for NewProduct {
    type Error = AddProductFormError;

    fn try_from(value: AddProductForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            stub: NewProductStub {
                url: ProductUrl::new(value.url)?,
                parent_name: SubcategoryName::new(value.parent)?,
            },
            enrichment: ProductEnrichment {
                name: ProductName::new(value.name)?,
                price: value.price.map(ProductPrice::new).transpose()?,
                units: non_blank(value.product_units)
                    .map(ProductUnits::new)
                    .transpose()?,
                description: non_blank(value.description)
                    .map(ProductDescription::new)
                    .transpose()?,
                image_url: non_blank(value.image_url).map(ImageUrl::new).transpose()?,
                is_trend: value.is_trend,
            },
        })
    }
}

/// Query string for filtering products by name or by price.
#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub name: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

/// A validated product filter. Name takes precedence over price.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    Name(String),
    /// Inclusive range in whole cents.
    PriceRange(ProductPrice, ProductPrice),
    /// A price range no product can fall into.
    Unsatisfiable,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductSearchError {
    #[error("either `name` or both `low` and `high` are required")]
    MissingCriteria,
    #[error("invalid price bound: {0}")]
    InvalidPrice(String),
}

impl From<TypeConstraintError> for ProductSearchError {
    fn from(value: TypeConstraintError) -> Self {
        Self::InvalidPrice(value.to_string())
    }
}

impl TryFrom<ProductSearchQuery> for ProductFilter {
    type Error = ProductSearchError;

    fn try_from(value: ProductSearchQuery) -> Result<Self, Self::Error> {
        if let Some(name) = value.name {
            return Ok(Self::Name(name));
        }
        let (Some(low), Some(high)) = (value.low, value.high) else {
            return Err(ProductSearchError::MissingCriteria);
        };
        match (
            ProductPrice::lower_bound(low)?,
            ProductPrice::upper_bound(high)?,
        ) {
            (Some(low), Some(high)) => Ok(Self::PriceRange(low, high)),
            _ => Ok(Self::Unsatisfiable),
        }
    }
}

/// Optional offset/limit applied after an interval fetch.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct SliceQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl SliceQuery {
    /// Slicing applies only when both bounds are given.
    pub fn pagination(&self) -> Option<Pagination> {
        match (self.offset, self.limit) {
            (Some(offset), Some(limit)) => Some(Pagination::new(offset, limit)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> AddProductForm {
        serde_json::from_value(serde_json::json!({
            "parent": "Shoes",
            "url": "http://x",
            "name": "Sneaker",
            "price": 49.99,
            "product_units": "pair",
            "description": "",
            "image_url": "https://img.example.com/s.png",
            "is_trend": false
        }))
        .unwrap()
    }

    #[test]
    fn converts_valid_form_into_new_product() {
        let product = NewProduct::try_from(sample_form()).unwrap();

        assert_eq!(product.stub.parent_name, "Shoes");
        assert_eq!(product.stub.url, "http://x");
        assert_eq!(product.enrichment.name, "Sneaker");
        assert_eq!(product.enrichment.price.unwrap().cents(), 4999);
        assert_eq!(product.enrichment.units.unwrap(), "pair");
        assert!(product.enrichment.description.is_none());
        assert_eq!(product.enrichment.is_trend, Some(false));
    }

    #[test]
    fn rejects_invalid_urls() {
        let mut form = sample_form();
        form.url = "not a url".to_string();

        let err = NewProduct::try_from(form).unwrap_err();
        assert!(matches!(err, AddProductFormError::Validation(_)));
    }

    #[test]
    fn rejects_negative_prices() {
        let mut form = sample_form();
        form.price = Some(-1.0);

        assert!(NewProduct::try_from(form).is_err());
    }

    #[test]
    fn search_prefers_name_over_price() {
        let query = ProductSearchQuery {
            name: Some("Sne".into()),
            low: Some(1.0),
            high: Some(2.0),
        };
        assert_eq!(
            ProductFilter::try_from(query).unwrap(),
            ProductFilter::Name("Sne".into())
        );
    }

    #[test]
    fn price_bounds_stay_inside_the_requested_range() {
        let query = ProductSearchQuery {
            name: None,
            low: Some(10.004),
            high: Some(20.009),
        };
        assert_eq!(
            ProductFilter::try_from(query).unwrap(),
            ProductFilter::PriceRange(
                ProductPrice::from_cents(1001).unwrap(),
                ProductPrice::from_cents(2000).unwrap(),
            )
        );
    }

    #[test]
    fn negative_bounds_never_fail() {
        let query = ProductSearchQuery {
            name: None,
            low: Some(-5.0),
            high: Some(20.0),
        };
        assert_eq!(
            ProductFilter::try_from(query).unwrap(),
            ProductFilter::PriceRange(
                ProductPrice::from_cents(0).unwrap(),
                ProductPrice::from_cents(2000).unwrap(),
            )
        );

        let query = ProductSearchQuery {
            name: None,
            low: Some(0.0),
            high: Some(-1.0),
        };
        assert_eq!(
            ProductFilter::try_from(query).unwrap(),
            ProductFilter::Unsatisfiable
        );
    }

    #[test]
    fn search_requires_both_price_bounds() {
        let query = ProductSearchQuery {
            name: None,
            low: Some(10.0),
            high: None,
        };
        assert_eq!(
            ProductFilter::try_from(query).unwrap_err(),
            ProductSearchError::MissingCriteria
        );
    }

    #[test]
    fn slice_requires_offset_and_limit() {
        assert_eq!(SliceQuery::default().pagination(), None);
        let query = SliceQuery {
            offset: Some(2),
            limit: Some(5),
        };
        assert_eq!(query.pagination(), Some(Pagination::new(2, 5)));
    }
}
