use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::subcategory::{
    NewSubcategoryLvl2 as DomainNewSubcategoryLvl2, SubcategoryLvl1 as DomainSubcategoryLvl1,
    SubcategoryLvl2 as DomainSubcategoryLvl2,
};
use crate::domain::types::{
    CrawlUrl, SubcategoryLvl1Id, SubcategoryName, TypeConstraintError, WorkerId,
};

/// Diesel model representing the `subcategories_lvl1` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::subcategories_lvl1)]
pub struct SubcategoryLvl1 {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::subcategories_lvl1)]
pub struct NewSubcategoryLvl1<'a> {
    pub name: &'a str,
    pub category_id: i32,
}

/// Diesel model representing the `subcategories_lvl2` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::subcategories_lvl2)]
pub struct SubcategoryLvl2 {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub parsed_at: Option<NaiveDateTime>,
    pub subcat_lvl1_id: i32,
    pub claimed_by: Option<String>,
    pub claim_expires_at: Option<NaiveDateTime>,
}

/// Insertable form of [`SubcategoryLvl2`]; rows always start unparsed.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::subcategories_lvl2)]
pub struct NewSubcategoryLvl2<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub subcat_lvl1_id: i32,
}

impl<'a> NewSubcategoryLvl2<'a> {
    pub fn new(subcategory: &'a DomainNewSubcategoryLvl2, parent: SubcategoryLvl1Id) -> Self {
        Self {
            name: subcategory.name.as_str(),
            url: subcategory.url.as_str(),
            subcat_lvl1_id: parent.get(),
        }
    }
}

impl TryFrom<SubcategoryLvl1> for DomainSubcategoryLvl1 {
    type Error = TypeConstraintError;

    fn try_from(subcategory: SubcategoryLvl1) -> Result<Self, Self::Error> {
        Ok(Self {
            id: subcategory.id.try_into()?,
            name: SubcategoryName::new(subcategory.name)?,
            category_id: subcategory.category_id.try_into()?,
            deleted_at: subcategory.deleted_at,
        })
    }
}

impl TryFrom<SubcategoryLvl2> for DomainSubcategoryLvl2 {
    type Error = TypeConstraintError;

    fn try_from(subcategory: SubcategoryLvl2) -> Result<Self, Self::Error> {
        Ok(Self {
            id: subcategory.id.try_into()?,
            name: SubcategoryName::new(subcategory.name)?,
            url: CrawlUrl::new(subcategory.url)?,
            parsed_at: subcategory.parsed_at,
            subcat_lvl1_id: subcategory.subcat_lvl1_id.try_into()?,
            claimed_by: subcategory.claimed_by.map(WorkerId::new).transpose()?,
            claim_expires_at: subcategory.claim_expires_at,
        })
    }
}
