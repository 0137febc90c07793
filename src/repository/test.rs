use std::cell::{Cell, RefCell};

use crate::domain::category::Category;
use crate::domain::product::{
    NewProduct, NewProductProperty, NewProductStub, Product, ProductEnrichment, ProductProperty,
};
use crate::domain::subcategory::{NewSubcategoryLvl2, SubcategoryLvl1, SubcategoryLvl2};
use crate::domain::types::{
    CategoryId, CategoryName, ProductId, ProductPrice, ProductPropertyId, SubcategoryLvl1Id,
    SubcategoryLvl2Id, SubcategoryName,
};
use crate::domain::{CatalogEntry, CatalogTable};
use crate::repository::{
    CatalogReader, CategoryReader, CategoryWriter, ProductReader, ProductWriter, RepositoryError,
    RepositoryResult, current_timestamp,
};

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    categories: RefCell<Vec<Category>>,
    subcategories_lvl1: RefCell<Vec<SubcategoryLvl1>>,
    subcategories_lvl2: RefCell<Vec<SubcategoryLvl2>>,
    products: RefCell<Vec<Product>>,
    properties: RefCell<Vec<ProductProperty>>,
    next_id: Cell<i32>,
    unavailable: bool,
}

impl TestRepository {
    pub fn new(
        categories: Vec<Category>,
        subcategories_lvl2: Vec<SubcategoryLvl2>,
        products: Vec<Product>,
        properties: Vec<ProductProperty>,
    ) -> Self {
        Self {
            categories: RefCell::new(categories),
            subcategories_lvl2: RefCell::new(subcategories_lvl2),
            products: RefCell::new(products),
            properties: RefCell::new(properties),
            next_id: Cell::new(100),
            ..Default::default()
        }
    }

    /// A repository whose every call fails as if the database were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.unavailable {
            return Err(RepositoryError::ConnectionError("database is down".into()));
        }
        Ok(())
    }

    fn allocate_id(&self) -> i32 {
        let id = self.next_id.get().max(1);
        self.next_id.set(id + 1);
        id
    }
}

impl CatalogReader for TestRepository {
    fn get_by_id(&self, table: CatalogTable, id: i32) -> RepositoryResult<Option<CatalogEntry>> {
        self.check()?;
        let entry = match table {
            CatalogTable::Categories => self
                .categories
                .borrow()
                .iter()
                .find(|c| c.id == id && c.deleted_at.is_none())
                .cloned()
                .map(CatalogEntry::Category),
            CatalogTable::SubcategoriesLvl1 => self
                .subcategories_lvl1
                .borrow()
                .iter()
                .find(|s| s.id == id && s.deleted_at.is_none())
                .cloned()
                .map(CatalogEntry::SubcategoryLvl1),
            CatalogTable::SubcategoriesLvl2 => self
                .subcategories_lvl2
                .borrow()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .map(CatalogEntry::SubcategoryLvl2),
            CatalogTable::Products => self
                .products
                .borrow()
                .iter()
                .find(|p| p.id == id && p.deleted_at.is_none())
                .cloned()
                .map(CatalogEntry::Product),
            CatalogTable::ProductProperties => self
                .properties
                .borrow()
                .iter()
                .find(|p| p.id == id && p.deleted_at.is_none())
                .cloned()
                .map(CatalogEntry::ProductProperty),
        };
        Ok(entry)
    }
}

impl CategoryReader for TestRepository {
    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        self.check()?;
        Ok(self
            .categories
            .borrow()
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    fn get_category_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Category>> {
        self.check()?;
        Ok(self
            .categories
            .borrow()
            .iter()
            .filter(|c| (lo..=hi).contains(&c.id.get()) && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    fn get_subcategories_lvl1(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<SubcategoryLvl1>> {
        self.check()?;
        Ok(self
            .subcategories_lvl1
            .borrow()
            .iter()
            .filter(|s| s.category_id == category_id && s.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

impl CategoryWriter for TestRepository {
    fn insert_category(&self, name: &CategoryName) -> RepositoryResult<CategoryId> {
        self.check()?;
        let id = CategoryId::new(self.allocate_id())?;
        self.categories.borrow_mut().push(Category {
            id,
            name: name.clone(),
            deleted_at: None,
        });
        Ok(id)
    }

    fn insert_subcategory_lvl1(
        &self,
        name: &SubcategoryName,
        category_id: CategoryId,
    ) -> RepositoryResult<SubcategoryLvl1Id> {
        if self.get_category(category_id)?.is_none() {
            return Err(RepositoryError::IntegrityError(format!(
                "category {category_id} is missing or deleted"
            )));
        }
        let id = SubcategoryLvl1Id::new(self.allocate_id())?;
        self.subcategories_lvl1.borrow_mut().push(SubcategoryLvl1 {
            id,
            name: name.clone(),
            category_id,
            deleted_at: None,
        });
        Ok(id)
    }

    fn insert_subcategory_lvl2(
        &self,
        subcategory: &NewSubcategoryLvl2,
        parent_id: SubcategoryLvl1Id,
    ) -> RepositoryResult<SubcategoryLvl2Id> {
        self.check()?;
        let parent_live = self
            .subcategories_lvl1
            .borrow()
            .iter()
            .any(|s| s.id == parent_id && s.deleted_at.is_none());
        if !parent_live {
            return Err(RepositoryError::IntegrityError(format!(
                "subcategory {parent_id} is missing or deleted"
            )));
        }
        let id = SubcategoryLvl2Id::new(self.allocate_id())?;
        self.subcategories_lvl2.borrow_mut().push(SubcategoryLvl2 {
            id,
            name: subcategory.name.clone(),
            url: subcategory.url.clone(),
            parsed_at: None,
            subcat_lvl1_id: parent_id,
            claimed_by: None,
            claim_expires_at: None,
        });
        Ok(id)
    }

    fn soft_delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        self.check()?;
        let now = current_timestamp();
        let mut categories = self.categories.borrow_mut();
        let Some(category) = categories
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        else {
            return Ok(0);
        };
        category.deleted_at = Some(now);
        for child in self
            .subcategories_lvl1
            .borrow_mut()
            .iter_mut()
            .filter(|s| s.category_id == id && s.deleted_at.is_none())
        {
            child.deleted_at = Some(now);
        }
        Ok(1)
    }

    fn hard_delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        self.check()?;
        if self
            .subcategories_lvl1
            .borrow()
            .iter()
            .any(|s| s.category_id == id)
        {
            return Err(RepositoryError::IntegrityError(
                "FOREIGN KEY constraint failed".into(),
            ));
        }
        let mut categories = self.categories.borrow_mut();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(before - categories.len())
    }
}

impl ProductReader for TestRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        self.check()?;
        Ok(self
            .products
            .borrow()
            .iter()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    fn get_products_interval(&self, lo: i32, hi: i32) -> RepositoryResult<Vec<Product>> {
        self.check()?;
        Ok(self
            .products
            .borrow()
            .iter()
            .filter(|p| (lo..=hi).contains(&p.id.get()) && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    fn get_products_by_price_range(
        &self,
        lo: ProductPrice,
        hi: ProductPrice,
    ) -> RepositoryResult<Vec<Product>> {
        self.check()?;
        Ok(self
            .products
            .borrow()
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .filter(|p| p.price.is_some_and(|price| lo <= price && price <= hi))
            .cloned()
            .collect())
    }

    fn get_products_by_name_substring(&self, text: &str) -> RepositoryResult<Vec<Product>> {
        self.check()?;
        Ok(self
            .products
            .borrow()
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .filter(|p| p.name.as_ref().is_some_and(|name| name.as_str().contains(text)))
            .cloned()
            .collect())
    }

    fn get_product_properties(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<ProductProperty>> {
        self.check()?;
        Ok(self
            .properties
            .borrow()
            .iter()
            .filter(|p| p.product_id == product_id && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    fn get_product_with_properties(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<(Product, ProductProperty)>> {
        let Some(product) = self.get_product_by_id(product_id)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .get_product_properties(product_id)?
            .into_iter()
            .map(|property| (product.clone(), property))
            .collect())
    }
}

impl ProductWriter for TestRepository {
    fn insert_product_stub(&self, stub: &NewProductStub) -> RepositoryResult<ProductId> {
        self.check()?;
        let parent = self
            .subcategories_lvl2
            .borrow()
            .iter()
            .filter(|s| s.name == stub.parent_name)
            .map(|s| s.id)
            .min()
            .ok_or(RepositoryError::NotFound)?;

        let id = ProductId::new(self.allocate_id())?;
        self.products.borrow_mut().push(Product {
            id,
            url: stub.url.clone(),
            name: None,
            price: None,
            units: None,
            description: None,
            image_url: None,
            is_trend: None,
            parsed_at: None,
            deleted_at: None,
            subcat_lvl2_id: parent,
            claimed_by: None,
            claim_expires_at: None,
        });
        Ok(id)
    }

    fn update_product(
        &self,
        id: ProductId,
        enrichment: &ProductEnrichment,
    ) -> RepositoryResult<usize> {
        self.check()?;
        let mut products = self.products.borrow_mut();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        product.name = Some(enrichment.name.clone());
        product.price = enrichment.price;
        product.units = enrichment.units.clone();
        product.description = enrichment.description.clone();
        product.image_url = enrichment.image_url.clone();
        product.is_trend = enrichment.is_trend;
        product.parsed_at = Some(current_timestamp());
        product.claimed_by = None;
        product.claim_expires_at = None;
        Ok(1)
    }

    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        let id = self.insert_product_stub(&product.stub)?;
        self.update_product(id, &product.enrichment)?;
        Ok(id)
    }

    fn insert_product_property(
        &self,
        property: &NewProductProperty,
    ) -> RepositoryResult<ProductPropertyId> {
        if self.get_product_by_id(property.product_id)?.is_none() {
            return Err(RepositoryError::IntegrityError(format!(
                "product {} is missing or deleted",
                property.product_id
            )));
        }
        let id = ProductPropertyId::new(self.allocate_id())?;
        self.properties.borrow_mut().push(ProductProperty {
            id,
            name: property.name.clone(),
            value: property.value.clone(),
            product_id: property.product_id,
            deleted_at: None,
        });
        Ok(id)
    }

    fn soft_delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        self.check()?;
        let now = current_timestamp();
        let mut products = self.products.borrow_mut();
        let Some(product) = products
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
        else {
            return Ok(0);
        };
        product.deleted_at = Some(now);
        for property in self
            .properties
            .borrow_mut()
            .iter_mut()
            .filter(|p| p.product_id == id && p.deleted_at.is_none())
        {
            property.deleted_at = Some(now);
        }
        Ok(1)
    }

    fn hard_delete_product(&self, id: ProductId, cascade: bool) -> RepositoryResult<usize> {
        self.check()?;
        let mut properties = self.properties.borrow_mut();
        if properties.iter().any(|p| p.product_id == id) {
            if !cascade {
                return Err(RepositoryError::IntegrityError(
                    "FOREIGN KEY constraint failed".into(),
                ));
            }
            properties.retain(|p| p.product_id != id);
        }
        let mut products = self.products.borrow_mut();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(before - products.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CrawlUrl;

    fn listing() -> NewSubcategoryLvl2 {
        NewSubcategoryLvl2 {
            name: SubcategoryName::new("Running").unwrap(),
            url: CrawlUrl::new("https://shop.example.com/running").unwrap(),
        }
    }

    #[test]
    fn listing_insert_requires_live_parent() {
        let repo = TestRepository::default();
        let err = repo
            .insert_subcategory_lvl2(&listing(), SubcategoryLvl1Id::new(1).unwrap())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::IntegrityError(_)));

        let category = repo
            .insert_category(&CategoryName::new("Shoes").unwrap())
            .unwrap();
        let parent = repo
            .insert_subcategory_lvl1(&SubcategoryName::new("Sneakers").unwrap(), category)
            .unwrap();
        assert!(repo.insert_subcategory_lvl2(&listing(), parent).is_ok());

        repo.soft_delete_category(category).unwrap();
        let err = repo.insert_subcategory_lvl2(&listing(), parent).unwrap_err();
        assert!(matches!(err, RepositoryError::IntegrityError(_)));
    }

    #[test]
    fn listing_insert_fails_when_unavailable() {
        let err = TestRepository::unavailable()
            .insert_subcategory_lvl2(&listing(), SubcategoryLvl1Id::new(1).unwrap())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError(_)));
    }
}
