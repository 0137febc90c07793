use diesel::dsl::exists;
use diesel::prelude::*;

use crate::domain::category::Category;
use crate::domain::subcategory::{NewSubcategoryLvl2, SubcategoryLvl1};
use crate::domain::types::{
    CategoryId, CategoryName, SubcategoryLvl1Id, SubcategoryLvl2Id, SubcategoryName,
};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::models::subcategory::{
    NewSubcategoryLvl1 as DbNewSubcategoryLvl1, NewSubcategoryLvl2 as DbNewSubcategoryLvl2,
    SubcategoryLvl1 as DbSubcategoryLvl1,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryError, RepositoryResult,
    current_timestamp,
};

impl CategoryReader for DieselRepository {
    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.get()))
            .filter(categories::deleted_at.is_null())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }

    fn get_category_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        if hi < lo {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let items = categories::table
            .filter(categories::id.between(lo, hi))
            .filter(categories::deleted_at.is_null())
            .order(categories::id.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_subcategories_lvl1(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<SubcategoryLvl1>> {
        use crate::schema::subcategories_lvl1;

        let mut conn = self.conn()?;

        let items = subcategories_lvl1::table
            .filter(subcategories_lvl1::category_id.eq(category_id.get()))
            .filter(subcategories_lvl1::deleted_at.is_null())
            .order(subcategories_lvl1::id.asc())
            .load::<DbSubcategoryLvl1>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SubcategoryLvl1>, _>>()?;

        Ok(items)
    }
}

impl CategoryWriter for DieselRepository {
    fn insert_category(&self, name: &CategoryName) -> RepositoryResult<CategoryId> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let id = diesel::insert_into(categories::table)
            .values(DbNewCategory {
                name: name.as_str(),
            })
            .returning(categories::id)
            .get_result::<i32>(&mut conn)?;

        Ok(CategoryId::new(id)?)
    }

    fn insert_subcategory_lvl1(
        &self,
        name: &SubcategoryName,
        category_id: CategoryId,
    ) -> RepositoryResult<SubcategoryLvl1Id> {
        use crate::schema::{categories, subcategories_lvl1};

        let mut conn = self.conn()?;

        let id = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let parent_live = diesel::select(exists(
                categories::table
                    .filter(categories::id.eq(category_id.get()))
                    .filter(categories::deleted_at.is_null()),
            ))
            .get_result::<bool>(conn)?;

            if !parent_live {
                return Err(RepositoryError::IntegrityError(format!(
                    "category {category_id} is missing or deleted"
                )));
            }

            let id = diesel::insert_into(subcategories_lvl1::table)
                .values(DbNewSubcategoryLvl1 {
                    name: name.as_str(),
                    category_id: category_id.get(),
                })
                .returning(subcategories_lvl1::id)
                .get_result::<i32>(conn)?;
            Ok(id)
        })?;

        Ok(SubcategoryLvl1Id::new(id)?)
    }

    fn insert_subcategory_lvl2(
        &self,
        subcategory: &NewSubcategoryLvl2,
        parent_id: SubcategoryLvl1Id,
    ) -> RepositoryResult<SubcategoryLvl2Id> {
        use crate::schema::{subcategories_lvl1, subcategories_lvl2};

        let mut conn = self.conn()?;

        let id = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let parent_live = diesel::select(exists(
                subcategories_lvl1::table
                    .filter(subcategories_lvl1::id.eq(parent_id.get()))
                    .filter(subcategories_lvl1::deleted_at.is_null()),
            ))
            .get_result::<bool>(conn)?;

            if !parent_live {
                return Err(RepositoryError::IntegrityError(format!(
                    "subcategory {parent_id} is missing or deleted"
                )));
            }

            let id = diesel::insert_into(subcategories_lvl2::table)
                .values(DbNewSubcategoryLvl2::new(subcategory, parent_id))
                .returning(subcategories_lvl2::id)
                .get_result::<i32>(conn)?;
            Ok(id)
        })?;

        Ok(SubcategoryLvl2Id::new(id)?)
    }

    fn soft_delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::{categories, subcategories_lvl1};

        let mut conn = self.conn()?;
        let now = current_timestamp();

        let affected = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let affected = diesel::update(
                categories::table
                    .filter(categories::id.eq(id.get()))
                    .filter(categories::deleted_at.is_null()),
            )
            .set(categories::deleted_at.eq(now))
            .execute(conn)?;

            if affected == 0 {
                return Ok(0);
            }

            let children = diesel::update(
                subcategories_lvl1::table
                    .filter(subcategories_lvl1::category_id.eq(id.get()))
                    .filter(subcategories_lvl1::deleted_at.is_null()),
            )
            .set(subcategories_lvl1::deleted_at.eq(now))
            .execute(conn)?;

            log::info!("Soft-deleted category {id} and {children} subcategories");
            Ok(affected)
        })?;

        Ok(affected)
    }

    fn hard_delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::delete(categories::table.filter(categories::id.eq(id.get())))
            .execute(&mut conn)?;

        log::info!("Hard-deleted category {id} ({affected} rows)");
        Ok(affected)
    }
}
