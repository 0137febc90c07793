//! String-rendered projections handed to the presentation layer.
//!
//! Typed entities stay typed inside the crate; only here are they flattened
//! into `column -> value` maps. Null columns stay `None`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::product::{Product, ProductProperty};
use crate::domain::subcategory::{SubcategoryLvl1, SubcategoryLvl2};
use crate::domain::CatalogEntry;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row rendered as column name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<&'static str, Option<String>>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, column: &'static str, value: impl ToString) {
        self.0.insert(column, Some(value.to_string()));
    }

    fn set_opt<T: ToString>(&mut self, column: &'static str, value: Option<T>) {
        self.0.insert(column, value.map(|v| v.to_string()));
    }

    fn set_timestamp(&mut self, column: &'static str, value: Option<NaiveDateTime>) {
        self.0
            .insert(column, value.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string()));
    }

    /// Rendered value of `column`; `None` when absent or null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|value| value.as_deref())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Conversion of a typed entity into its string projection.
pub trait IntoRecord {
    fn into_record(self) -> Record;
}

pub fn into_records<T: IntoRecord>(items: Vec<T>) -> Vec<Record> {
    items.into_iter().map(IntoRecord::into_record).collect()
}

impl IntoRecord for Category {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.set("id", self.id);
        record.set("name", self.name);
        record.set_timestamp("deleted_at", self.deleted_at);
        record
    }
}

impl IntoRecord for SubcategoryLvl1 {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.set("id", self.id);
        record.set("name", self.name);
        record.set("category_id", self.category_id);
        record.set_timestamp("deleted_at", self.deleted_at);
        record
    }
}

impl IntoRecord for SubcategoryLvl2 {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.set("id", self.id);
        record.set("name", self.name);
        record.set("url", self.url);
        record.set_timestamp("parsed_at", self.parsed_at);
        record.set("subcat_lvl1_id", self.subcat_lvl1_id);
        record
    }
}

impl IntoRecord for Product {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.set("id", self.id);
        record.set("url", self.url);
        record.set_opt("name", self.name);
        record.set_opt("price", self.price);
        record.set_opt("units", self.units);
        record.set_opt("description", self.description);
        record.set_opt("image_url", self.image_url);
        record.set_opt("is_trend", self.is_trend);
        record.set_timestamp("parsed_at", self.parsed_at);
        record.set_timestamp("deleted_at", self.deleted_at);
        record.set("subcat_lvl2_id", self.subcat_lvl2_id);
        record
    }
}

impl IntoRecord for ProductProperty {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.set("id", self.id);
        record.set("name", self.name);
        record.set("value", self.value);
        record.set("product_id", self.product_id);
        record.set_timestamp("deleted_at", self.deleted_at);
        record
    }
}

/// Joined row: product columns plus property columns prefixed with `property_`.
impl IntoRecord for (Product, ProductProperty) {
    fn into_record(self) -> Record {
        let (product, property) = self;
        let mut record = product.into_record();
        record.set("property_id", property.id);
        record.set("property_name", property.name);
        record.set("property_value", property.value);
        record.set_timestamp("property_deleted_at", property.deleted_at);
        record
    }
}

impl IntoRecord for CatalogEntry {
    fn into_record(self) -> Record {
        match self {
            Self::Category(category) => category.into_record(),
            Self::SubcategoryLvl1(subcategory) => subcategory.into_record(),
            Self::SubcategoryLvl2(subcategory) => subcategory.into_record(),
            Self::Product(product) => product.into_record(),
            Self::ProductProperty(property) => property.into_record(),
        }
    }
}
