//! Crawl progress tracking.
//!
//! A row is claimable while `parsed_at IS NULL` and its lease is absent or
//! expired. Claims run inside `BEGIN IMMEDIATE`, which takes SQLite's write
//! lock before the candidate is selected, so two workers can never lease the
//! same row at once. A worker that dies simply lets its lease run out.
//!
//! Completions are scoped to the caller's lease: a row already parsed is left
//! untouched, and a row leased to another worker is refused with
//! [`RepositoryError::LeaseLost`].

use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;

use crate::domain::crawl::{ClaimedProduct, ClaimedSubcategory};
use crate::domain::product::ProductEnrichment;
use crate::domain::types::{CrawlUrl, ProductId, ProductUrl, SubcategoryLvl2Id, SubcategoryName};
use crate::models::product::ProductEnrichmentChangeset;
use crate::repository::{
    CrawlStateReader, CrawlStateWriter, DieselRepository, RepositoryError, RepositoryResult,
    current_timestamp,
};

impl CrawlStateReader for DieselRepository {
    fn all_subcategories_parsed(&self) -> RepositoryResult<bool> {
        use crate::schema::subcategories_lvl2;

        let mut conn = self.conn()?;

        let pending = diesel::select(exists(
            subcategories_lvl2::table.filter(subcategories_lvl2::parsed_at.is_null()),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(!pending)
    }

    fn all_products_parsed(&self) -> RepositoryResult<bool> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let pending = diesel::select(exists(
            products::table
                .filter(products::parsed_at.is_null())
                .filter(products::deleted_at.is_null()),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(!pending)
    }

    fn subcategory_count_at_least(&self, n: i64) -> RepositoryResult<bool> {
        use crate::schema::subcategories_lvl2;

        let mut conn = self.conn()?;

        let total = subcategories_lvl2::table
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total >= n)
    }
}

impl DieselRepository {
    fn lease_expiry(&self, now: NaiveDateTime) -> RepositoryResult<NaiveDateTime> {
        now.checked_add_signed(self.lease.duration).ok_or_else(|| {
            RepositoryError::ValidationError(format!(
                "lease of {} seconds overflows the clock",
                self.lease.duration.num_seconds()
            ))
        })
    }

    /// Writes `enrichment` unless the product is parsed or leased elsewhere.
    fn complete_product(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<bool> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let worker = self.lease.worker_id.as_str();

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let affected = diesel::update(
                products::table
                    .filter(products::id.eq(id.get()))
                    .filter(products::parsed_at.is_null())
                    .filter(
                        products::claimed_by
                            .is_null()
                            .or(products::claimed_by.eq(worker)),
                    ),
            )
            .set(ProductEnrichmentChangeset::new(enrichment, current_timestamp()))
            .execute(conn)?;

            if affected > 0 {
                return Ok(true);
            }

            let state = products::table
                .filter(products::id.eq(id.get()))
                .select((products::parsed_at, products::claimed_by))
                .first::<(Option<NaiveDateTime>, Option<String>)>(conn)
                .optional()?;

            match state {
                None => Err(RepositoryError::NotFound),
                Some((Some(_), _)) => Ok(false),
                Some((None, holder)) => {
                    Err(RepositoryError::LeaseLost(holder.unwrap_or_default()))
                }
            }
        })
    }
}

impl CrawlStateWriter for DieselRepository {
    fn claim_next_unparsed_subcategory(&self) -> RepositoryResult<Option<ClaimedSubcategory>> {
        use crate::schema::subcategories_lvl2;

        let mut conn = self.conn()?;
        let now = current_timestamp();
        let expires_at = self.lease_expiry(now)?;
        let worker = self.lease.worker_id.as_str();

        let claimed = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let candidate = subcategories_lvl2::table
                .filter(subcategories_lvl2::parsed_at.is_null())
                .filter(
                    subcategories_lvl2::claim_expires_at
                        .is_null()
                        .or(subcategories_lvl2::claim_expires_at.le(now)),
                )
                .order(subcategories_lvl2::id.asc())
                .select((
                    subcategories_lvl2::id,
                    subcategories_lvl2::url,
                    subcategories_lvl2::name,
                ))
                .first::<(i32, String, String)>(conn)
                .optional()?;

            let Some((id, url, name)) = candidate else {
                return Ok(None);
            };

            diesel::update(subcategories_lvl2::table.filter(subcategories_lvl2::id.eq(id)))
                .set((
                    subcategories_lvl2::claimed_by.eq(worker),
                    subcategories_lvl2::claim_expires_at.eq(expires_at),
                ))
                .execute(conn)?;

            Ok(Some(ClaimedSubcategory {
                id: id.try_into()?,
                url: CrawlUrl::new(url)?,
                name: SubcategoryName::new(name)?,
            }))
        })?;

        if let Some(subcategory) = &claimed {
            log::debug!(
                "Worker {worker} claimed subcategory {} until {expires_at}",
                subcategory.id
            );
        }
        Ok(claimed)
    }

    fn mark_subcategory_parsed(&self, id: SubcategoryLvl2Id) -> RepositoryResult<()> {
        use crate::schema::subcategories_lvl2;

        let mut conn = self.conn()?;
        let worker = self.lease.worker_id.as_str();

        let written = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let affected = diesel::update(
                subcategories_lvl2::table
                    .filter(subcategories_lvl2::id.eq(id.get()))
                    .filter(subcategories_lvl2::parsed_at.is_null())
                    .filter(
                        subcategories_lvl2::claimed_by
                            .is_null()
                            .or(subcategories_lvl2::claimed_by.eq(worker)),
                    ),
            )
            .set((
                subcategories_lvl2::parsed_at.eq(current_timestamp()),
                subcategories_lvl2::claimed_by.eq(None::<String>),
                subcategories_lvl2::claim_expires_at.eq(None::<NaiveDateTime>),
            ))
            .execute(conn)?;

            if affected > 0 {
                return Ok(true);
            }

            let state = subcategories_lvl2::table
                .filter(subcategories_lvl2::id.eq(id.get()))
                .select((subcategories_lvl2::parsed_at, subcategories_lvl2::claimed_by))
                .first::<(Option<NaiveDateTime>, Option<String>)>(conn)
                .optional()?;

            match state {
                None => Err(RepositoryError::NotFound),
                Some((Some(_), _)) => Ok(false),
                Some((None, holder)) => {
                    Err(RepositoryError::LeaseLost(holder.unwrap_or_default()))
                }
            }
        })?;

        if written {
            log::debug!("Subcategory {id} parsed");
        }
        Ok(())
    }

    fn claim_next_unparsed_product(&self) -> RepositoryResult<Option<ClaimedProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = current_timestamp();
        let expires_at = self.lease_expiry(now)?;
        let worker = self.lease.worker_id.as_str();

        let claimed = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let candidate = products::table
                .filter(products::parsed_at.is_null())
                .filter(products::deleted_at.is_null())
                .filter(
                    products::claim_expires_at
                        .is_null()
                        .or(products::claim_expires_at.le(now)),
                )
                .order(products::id.asc())
                .select((products::id, products::url))
                .first::<(i32, String)>(conn)
                .optional()?;

            let Some((id, url)) = candidate else {
                return Ok(None);
            };

            diesel::update(products::table.filter(products::id.eq(id)))
                .set((
                    products::claimed_by.eq(worker),
                    products::claim_expires_at.eq(expires_at),
                ))
                .execute(conn)?;

            Ok(Some(ClaimedProduct {
                id: id.try_into()?,
                url: ProductUrl::new(url)?,
            }))
        })?;

        if let Some(product) = &claimed {
            log::debug!(
                "Worker {worker} claimed product {} until {expires_at}",
                product.id
            );
        }
        Ok(claimed)
    }

    fn mark_product_parsed(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<()> {
        if self.complete_product(id, enrichment)? {
            log::debug!("Product {id} parsed");
        }
        Ok(())
    }

    fn mark_product_error(&self, id: ProductId) -> RepositoryResult<()> {
        if self.complete_product(id, &ProductEnrichment::crawl_error())? {
            log::warn!("Product {id} could not be parsed; recorded error sentinel");
        }
        Ok(())
    }
}
