//! Helpers for integration tests.
#![allow(dead_code)]

use catalog_crawl_store::db::{DbPool, establish_connection_pool};
use catalog_crawl_store::domain::crawl::CrawlLease;
use catalog_crawl_store::domain::subcategory::NewSubcategoryLvl2;
use catalog_crawl_store::domain::types::{
    CategoryName, CrawlUrl, SubcategoryLvl1Id, SubcategoryLvl2Id, SubcategoryName, WorkerId,
};
use catalog_crawl_store::repository::{CategoryWriter, DieselRepository, SchemaManager};
use tempfile::NamedTempFile;

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        DieselRepository::new(pool.clone())
            .create_schema()
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    /// Repository claiming as `worker` with the given lease length.
    pub fn worker(&self, worker: &str, lease_seconds: i64) -> DieselRepository {
        self.repo().with_lease(CrawlLease::new(
            WorkerId::new(worker).unwrap(),
            chrono::Duration::seconds(lease_seconds),
        ))
    }
}

/// Inserts `Shoes > Sneakers` and returns the first-level id.
pub fn seed_hierarchy(repo: &DieselRepository) -> SubcategoryLvl1Id {
    let category = repo
        .insert_category(&CategoryName::new("Shoes").unwrap())
        .unwrap();
    repo.insert_subcategory_lvl1(&SubcategoryName::new("Sneakers").unwrap(), category)
        .unwrap()
}

pub fn insert_listing(
    repo: &DieselRepository,
    parent: SubcategoryLvl1Id,
    name: &str,
    url: &str,
) -> SubcategoryLvl2Id {
    repo.insert_subcategory_lvl2(
        &NewSubcategoryLvl2 {
            name: SubcategoryName::new(name).unwrap(),
            url: CrawlUrl::new(url).unwrap(),
        },
        parent,
    )
    .unwrap()
}
