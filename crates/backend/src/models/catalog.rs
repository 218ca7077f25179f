//! Catalog records: brands, categories, products, reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperleaf_core::{BrandId, CategoryId, Price, ProductId, ReviewId, UserId};

use super::impl_record;

/// A named product grouping owned by a manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub image_url: String,
}

/// A named product grouping by kind of good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image_url: String,
}

/// A sellable product. Belongs to exactly one brand and one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// Units on hand; debited when order items are created or grown.
    pub stock: u32,
    pub brand_id: BrandId,
    pub category_id: CategoryId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// 1..=5, validated at the gate.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_record!(Brand, Brand);
impl_record!(Category, Category);
impl_record!(Product, Product);
impl_record!(Review, Review);
