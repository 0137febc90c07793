use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProductProperty as DomainNewProductProperty, Product as DomainProduct,
    ProductEnrichment, ProductProperty as DomainProductProperty,
};
use crate::domain::types::{
    ImageUrl, ProductDescription, ProductName, ProductPrice, ProductUnits, ProductUrl,
    PropertyName, TypeConstraintError, WorkerId,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub url: String,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub units: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_trend: Option<bool>,
    pub parsed_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
    pub subcat_lvl2_id: i32,
    pub claimed_by: Option<String>,
    pub claim_expires_at: Option<NaiveDateTime>,
}

/// Insertable stub: only the URL and parent are known.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductStub<'a> {
    pub url: &'a str,
    pub subcat_lvl2_id: i32,
}

/// Changeset written when a product page has been parsed.
///
/// `treat_none_as_null` makes absent enrichment fields overwrite stale values.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductEnrichmentChangeset<'a> {
    pub name: Option<&'a str>,
    pub price_cents: Option<i64>,
    pub units: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub is_trend: Option<bool>,
    pub parsed_at: Option<NaiveDateTime>,
    pub claimed_by: Option<&'a str>,
    pub claim_expires_at: Option<NaiveDateTime>,
}

impl<'a> ProductEnrichmentChangeset<'a> {
    /// Builds the changeset, stamping `parsed_at` and releasing any lease.
    pub fn new(enrichment: &'a ProductEnrichment, parsed_at: NaiveDateTime) -> Self {
        Self {
            name: Some(enrichment.name.as_str()),
            price_cents: enrichment.price.map(ProductPrice::cents),
            units: enrichment.units.as_ref().map(ProductUnits::as_str),
            description: enrichment.description.as_ref().map(ProductDescription::as_str),
            image_url: enrichment.image_url.as_ref().map(ImageUrl::as_str),
            is_trend: enrichment.is_trend,
            parsed_at: Some(parsed_at),
            claimed_by: None,
            claim_expires_at: None,
        }
    }
}

/// Diesel model representing the `product_properties` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::product_properties)]
pub struct ProductProperty {
    pub id: i32,
    pub name: String,
    pub value: String,
    pub product_id: i32,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_properties)]
pub struct NewProductProperty<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub product_id: i32,
}

impl<'a> From<&'a DomainNewProductProperty> for NewProductProperty<'a> {
    fn from(property: &'a DomainNewProductProperty) -> Self {
        Self {
            name: property.name.as_str(),
            value: property.value.as_str(),
            product_id: property.product_id.get(),
        }
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id.try_into()?,
            url: ProductUrl::new(product.url)?,
            name: product.name.map(ProductName::new).transpose()?,
            price: product.price_cents.map(ProductPrice::from_cents).transpose()?,
            units: product.units.map(ProductUnits::new).transpose()?,
            description: product.description.map(ProductDescription::new).transpose()?,
            image_url: product.image_url.map(ImageUrl::new).transpose()?,
            is_trend: product.is_trend,
            parsed_at: product.parsed_at,
            deleted_at: product.deleted_at,
            subcat_lvl2_id: product.subcat_lvl2_id.try_into()?,
            claimed_by: product.claimed_by.map(WorkerId::new).transpose()?,
            claim_expires_at: product.claim_expires_at,
        })
    }
}

impl TryFrom<ProductProperty> for DomainProductProperty {
    type Error = TypeConstraintError;

    fn try_from(property: ProductProperty) -> Result<Self, Self::Error> {
        Ok(Self {
            id: property.id.try_into()?,
            name: PropertyName::new(property.name)?,
            value: property.value,
            product_id: property.product_id.try_into()?,
            deleted_at: property.deleted_at,
        })
    }
}
