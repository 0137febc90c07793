use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, CrawlUrl, SubcategoryLvl1Id, SubcategoryLvl2Id, SubcategoryName, WorkerId,
};

/// First-level subcategory grouping crawlable listings under a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubcategoryLvl1 {
    pub id: SubcategoryLvl1Id,
    pub name: SubcategoryName,
    pub category_id: CategoryId,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Second-level subcategory: a listing page the crawler visits once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubcategoryLvl2 {
    pub id: SubcategoryLvl2Id,
    pub name: SubcategoryName,
    pub url: CrawlUrl,
    /// `None` until the listing has been crawled.
    pub parsed_at: Option<NaiveDateTime>,
    pub subcat_lvl1_id: SubcategoryLvl1Id,
    pub claimed_by: Option<WorkerId>,
    pub claim_expires_at: Option<NaiveDateTime>,
}

/// Data required to insert a new [`SubcategoryLvl2`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSubcategoryLvl2 {
    pub name: SubcategoryName,
    pub url: CrawlUrl,
}
