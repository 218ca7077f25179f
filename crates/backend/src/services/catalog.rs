//! Catalog operations: brands, categories, products.

use chrono::Utc;
use serde_json::{Map, Value, json};

use copperleaf_core::{BrandId, CategoryId, Price, ProductId};

use super::cascade::{CascadeOrchestrator, RootKind};
use super::{fetch_required, images};
use crate::error::BackendError;
use crate::models::{Brand, Category, Product};
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, MAX_BODY_LENGTH, MAX_TEXT_LENGTH};

/// Brand service.
pub struct BrandService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> BrandService<'a> {
    /// Create a brand service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed name.
    pub async fn create(&self, name: String) -> Result<Brand, BackendError> {
        validate::require_text("name", &name, MAX_TEXT_LENGTH)?;
        let brand = Brand {
            id: BrandId::generate(),
            name,
            image_url: images::BRAND_IMAGE_PLACEHOLDER.to_owned(),
        };
        self.records.create(&brand).await?;
        Ok(brand)
    }

    /// Rename a brand.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed name, `NotFound` if absent.
    pub async fn update(&self, id: BrandId, name: String) -> Result<Brand, BackendError> {
        validate::require_text("name", &name, MAX_TEXT_LENGTH)?;
        self.records
            .update::<Brand>(id, json!({"name": name}))
            .await?
            .ok_or(BackendError::not_found("brand"))
    }

    /// Fetch a brand by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: BrandId) -> Result<Brand, BackendError> {
        fetch_required(self.records, id).await
    }

    /// All brands.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<Brand>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// Delete a brand and its products (full product cascade each).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: BrandId) -> Result<Brand, BackendError> {
        Ok(CascadeOrchestrator::new(self.store).delete_brand(id).await?)
    }

    /// Delete every brand and every product.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::Brand)
            .await?)
    }
}

/// Category service. Mirrors [`BrandService`].
pub struct CategoryService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> CategoryService<'a> {
    /// Create a category service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed name.
    pub async fn create(&self, name: String) -> Result<Category, BackendError> {
        validate::require_text("name", &name, MAX_TEXT_LENGTH)?;
        let category = Category {
            id: CategoryId::generate(),
            name,
            image_url: images::BRAND_IMAGE_PLACEHOLDER.to_owned(),
        };
        self.records.create(&category).await?;
        Ok(category)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed name, `NotFound` if absent.
    pub async fn update(&self, id: CategoryId, name: String) -> Result<Category, BackendError> {
        validate::require_text("name", &name, MAX_TEXT_LENGTH)?;
        self.records
            .update::<Category>(id, json!({"name": name}))
            .await?
            .ok_or(BackendError::not_found("category"))
    }

    /// Fetch a category by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: CategoryId) -> Result<Category, BackendError> {
        fetch_required(self.records, id).await
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// Delete a category and its products (full product cascade each).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: CategoryId) -> Result<Category, BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_category(id)
            .await?)
    }

    /// Delete every category and every product.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::Category)
            .await?)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub brand_id: BrandId,
    pub category_id: CategoryId,
}

/// Input for updating a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
}

/// Product service.
pub struct ProductService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a product service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create a product under an existing brand and category.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the brand or
    /// category is absent.
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, BackendError> {
        validate::require_text("name", &input.name, MAX_TEXT_LENGTH)?;
        if let Some(description) = &input.description {
            validate::require_text("description", description, MAX_BODY_LENGTH)?;
        }
        validate::require_non_negative("price", input.price)?;

        let _: Brand = fetch_required(self.records, input.brand_id).await?;
        let _: Category = fetch_required(self.records, input.category_id).await?;

        let product = Product {
            id: ProductId::generate(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            brand_id: input.brand_id,
            category_id: input.category_id,
            image_url: images::PRODUCT_IMAGE_PLACEHOLDER.to_owned(),
            created_at: Utc::now(),
        };
        self.records.create(&product).await?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Update product fields. Setting `stock` here is an absolute write (a
    /// restock correction), distinct from the order flow's delta debits.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed fields, `NotFound` if absent.
    pub async fn update(
        &self,
        id: ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, BackendError> {
        let mut patch = Map::new();
        if let Some(name) = input.name {
            validate::require_text("name", &name, MAX_TEXT_LENGTH)?;
            patch.insert("name".to_owned(), Value::String(name));
        }
        if let Some(description) = input.description {
            validate::require_text("description", &description, MAX_BODY_LENGTH)?;
            patch.insert("description".to_owned(), Value::String(description));
        }
        if let Some(price) = input.price {
            validate::require_non_negative("price", price)?;
            patch.insert("price".to_owned(), json!(price));
        }
        if let Some(stock) = input.stock {
            patch.insert("stock".to_owned(), Value::from(stock));
        }
        if patch.is_empty() {
            return fetch_required(self.records, id).await;
        }

        self.records
            .update::<Product>(id, Value::Object(patch))
            .await?
            .ok_or(BackendError::not_found("product"))
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Product, BackendError> {
        fetch_required(self.records, id).await
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// Products of one brand.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_by_brand(&self, brand_id: BrandId) -> Result<Vec<Product>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("brand_id", brand_id))
            .await?)
    }

    /// Products of one category.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("category_id", category_id))
            .await?)
    }

    /// Delete a product and every reference to it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: ProductId) -> Result<Product, BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_product(id)
            .await?)
    }

    /// Delete every product and every reference to any product.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::Product)
            .await?)
    }
}
