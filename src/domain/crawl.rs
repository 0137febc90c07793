use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CrawlUrl, ProductId, ProductUrl, SubcategoryLvl2Id, SubcategoryName, WorkerId,
};

/// Default time a claim is held before another worker may take it over.
pub const DEFAULT_LEASE_SECONDS: i64 = 600;

/// A subcategory listing handed to a worker for crawling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimedSubcategory {
    pub id: SubcategoryLvl2Id,
    pub url: CrawlUrl,
    pub name: SubcategoryName,
}

/// A product page handed to a worker for crawling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimedProduct {
    pub id: ProductId,
    pub url: ProductUrl,
}

/// Identity and lease length used when claiming unparsed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlLease {
    pub worker_id: WorkerId,
    pub duration: Duration,
}

impl CrawlLease {
    pub fn new(worker_id: WorkerId, duration: Duration) -> Self {
        Self {
            worker_id,
            duration,
        }
    }
}

impl Default for CrawlLease {
    fn default() -> Self {
        Self {
            worker_id: WorkerId::for_current_process(),
            duration: Duration::seconds(DEFAULT_LEASE_SECONDS),
        }
    }
}
