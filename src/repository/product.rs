use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::domain::product::{
    NewProduct, NewProductProperty, NewProductStub, Product, ProductEnrichment, ProductProperty,
};
use crate::domain::types::{ProductId, ProductPrice, ProductPropertyId};
use crate::models::product::{
    NewProductProperty as DbNewProductProperty, NewProductStub as DbNewProductStub,
    Product as DbProduct, ProductEnrichmentChangeset, ProductProperty as DbProductProperty,
};
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
    current_timestamp,
};

diesel::define_sql_function! {
    /// SQLite `instr`: 1-based position of `needle` in `haystack`, 0 when absent.
    fn instr(haystack: Nullable<Text>, needle: Text) -> Nullable<Integer>;
}

/// Resolves the parent listing by name and inserts the stub row.
pub(crate) fn insert_stub(
    conn: &mut SqliteConnection,
    stub: &NewProductStub,
) -> RepositoryResult<i32> {
    use crate::schema::{products, subcategories_lvl2};

    let parent_id = subcategories_lvl2::table
        .filter(subcategories_lvl2::name.eq(stub.parent_name.as_str()))
        .order(subcategories_lvl2::id.asc())
        .select(subcategories_lvl2::id)
        .first::<i32>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    let id = diesel::insert_into(products::table)
        .values(DbNewProductStub {
            url: stub.url.as_str(),
            subcat_lvl2_id: parent_id,
        })
        .returning(products::id)
        .get_result::<i32>(conn)?;

    Ok(id)
}

/// Writes enrichment fields, stamps `parsed_at` and releases the lease.
pub(crate) fn enrich(
    conn: &mut SqliteConnection,
    id: ProductId,
    enrichment: &ProductEnrichment,
) -> RepositoryResult<usize> {
    use crate::schema::products;

    let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
        .set(ProductEnrichmentChangeset::new(enrichment, current_timestamp()))
        .execute(conn)?;

    if affected == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(affected)
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::id.eq(id.get()))
            .filter(products::deleted_at.is_null())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }

    fn get_products_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        if hi < lo {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let items = products::table
            .filter(products::id.between(lo, hi))
            .filter(products::deleted_at.is_null())
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_products_by_price_range(
        &self,
        lo: ProductPrice,
        hi: ProductPrice,
    ) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        if hi < lo {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let items = products::table
            .filter(products::price_cents.between(lo.cents(), hi.cents()))
            .filter(products::deleted_at.is_null())
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_products_by_name_substring(&self, text: &str) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let items = products::table
            .filter(instr(products::name, text).gt(0))
            .filter(products::deleted_at.is_null())
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_product_properties(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<ProductProperty>> {
        use crate::schema::product_properties;

        let mut conn = self.conn()?;

        let items = product_properties::table
            .filter(product_properties::product_id.eq(product_id.get()))
            .filter(product_properties::deleted_at.is_null())
            .order(product_properties::id.asc())
            .load::<DbProductProperty>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<ProductProperty>, _>>()?;

        Ok(items)
    }

    fn get_product_with_properties(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<(Product, ProductProperty)>> {
        use crate::schema::{product_properties, products};

        let mut conn = self.conn()?;

        let rows = products::table
            .inner_join(product_properties::table)
            .filter(products::id.eq(product_id.get()))
            .filter(products::deleted_at.is_null())
            .filter(product_properties::deleted_at.is_null())
            .order(product_properties::id.asc())
            .load::<(DbProduct, DbProductProperty)>(&mut conn)?;

        let mut items = Vec::with_capacity(rows.len());
        for (product, property) in rows {
            let product: Product = product.try_into()?;
            let property: ProductProperty = property.try_into()?;
            items.push((product, property));
        }
        Ok(items)
    }
}

impl ProductWriter for DieselRepository {
    fn insert_product_stub(&self, stub: &NewProductStub) -> RepositoryResult<ProductId> {
        let mut conn = self.conn()?;

        let id = conn.immediate_transaction(|conn| insert_stub(conn, stub))?;

        Ok(ProductId::new(id)?)
    }

    fn update_product(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        enrich(&mut conn, id, enrichment)
    }

    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        let mut conn = self.conn()?;

        let id = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let id = ProductId::new(insert_stub(conn, &product.stub)?)?;
            enrich(conn, id, &product.enrichment)?;
            Ok(id)
        })?;

        Ok(id)
    }

    fn insert_product_property(
        &self,
        property: &NewProductProperty,
    ) -> RepositoryResult<ProductPropertyId> {
        use crate::schema::{product_properties, products};

        let mut conn = self.conn()?;

        let id = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let product_live = diesel::select(exists(
                products::table
                    .filter(products::id.eq(property.product_id.get()))
                    .filter(products::deleted_at.is_null()),
            ))
            .get_result::<bool>(conn)?;

            if !product_live {
                return Err(RepositoryError::IntegrityError(format!(
                    "product {} is missing or deleted",
                    property.product_id
                )));
            }

            let id = diesel::insert_into(product_properties::table)
                .values(DbNewProductProperty::from(property))
                .returning(product_properties::id)
                .get_result::<i32>(conn)?;
            Ok(id)
        })?;

        Ok(ProductPropertyId::new(id)?)
    }

    fn soft_delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::{product_properties, products};

        let mut conn = self.conn()?;
        let now = current_timestamp();

        let affected = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let affected = diesel::update(
                products::table
                    .filter(products::id.eq(id.get()))
                    .filter(products::deleted_at.is_null()),
            )
            .set(products::deleted_at.eq(now))
            .execute(conn)?;

            if affected == 0 {
                return Ok(0);
            }

            let properties = diesel::update(
                product_properties::table
                    .filter(product_properties::product_id.eq(id.get()))
                    .filter(product_properties::deleted_at.is_null()),
            )
            .set(product_properties::deleted_at.eq(now))
            .execute(conn)?;

            log::info!("Soft-deleted product {id} and {properties} properties");
            Ok(affected)
        })?;

        Ok(affected)
    }

    fn hard_delete_product(&self, id: ProductId, cascade: bool) -> RepositoryResult<usize> {
        use crate::schema::{product_properties, products};

        let mut conn = self.conn()?;

        let affected = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            if cascade {
                diesel::delete(
                    product_properties::table
                        .filter(product_properties::product_id.eq(id.get())),
                )
                .execute(conn)?;
            }

            let affected = diesel::delete(products::table.filter(products::id.eq(id.get())))
                .execute(conn)?;
            Ok(affected)
        })?;

        log::info!("Hard-deleted product {id} ({affected} rows, cascade: {cascade})");
        Ok(affected)
    }
}
