//! Product review operations.
//!
//! Reviews are children of both a user and a product; they are never
//! cascade roots, so deletion is a plain record delete.

use chrono::Utc;
use serde_json::{Map, Value};

use copperleaf_core::{ProductId, ReviewId, UserId};

use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Product, Review, User};
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, MAX_BODY_LENGTH, ValidationError};

/// Input for creating a review.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateReviewInput {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: Option<String>,
}

impl CreateReviewInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::require_range("rating", u32::from(self.rating), 1, 5)?;
        if let Some(comment) = &self.comment {
            validate::require_text("comment", comment, MAX_BODY_LENGTH)?;
        }
        Ok(())
    }
}

/// Input for updating a review. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateReviewInput {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Review service.
pub struct ReviewService<'a> {
    records: Records<'a>,
}

impl<'a> ReviewService<'a> {
    /// Create a review service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Create a review by an existing user on an existing product.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a rating outside 1..=5, `NotFound` if the
    /// user or product is absent.
    pub async fn create(&self, input: CreateReviewInput) -> Result<Review, BackendError> {
        input.validate()?;
        let _: User = fetch_required(self.records, input.user_id).await?;
        let _: Product = fetch_required(self.records, input.product_id).await?;

        let review = Review {
            id: ReviewId::generate(),
            user_id: input.user_id,
            product_id: input.product_id,
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        };
        self.records.create(&review).await?;
        Ok(review)
    }

    /// Update a review's rating and/or comment.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed fields, `NotFound` if absent.
    pub async fn update(
        &self,
        id: ReviewId,
        input: UpdateReviewInput,
    ) -> Result<Review, BackendError> {
        let mut patch = Map::new();
        if let Some(rating) = input.rating {
            validate::require_range("rating", u32::from(rating), 1, 5)?;
            patch.insert("rating".to_owned(), Value::from(rating));
        }
        if let Some(comment) = input.comment {
            validate::require_text("comment", &comment, MAX_BODY_LENGTH)?;
            patch.insert("comment".to_owned(), Value::String(comment));
        }
        if patch.is_empty() {
            return fetch_required(self.records, id).await;
        }

        self.records
            .update::<Review>(id, Value::Object(patch))
            .await?
            .ok_or(BackendError::not_found("review"))
    }

    /// Fetch a review by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: ReviewId) -> Result<Review, BackendError> {
        fetch_required(self.records, id).await
    }

    /// All reviews of one product.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("product_id", product_id))
            .await?)
    }

    /// All reviews by one user.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Review>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("user_id", user_id))
            .await?)
    }

    /// Delete a review. A child delete: user and product are untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn delete(&self, id: ReviewId) -> Result<Review, BackendError> {
        self.records
            .delete::<Review>(id)
            .await?
            .ok_or(BackendError::not_found("review"))
    }

    /// Delete every review.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, BackendError> {
        Ok(self.records.delete_many::<Review>(&Filter::all()).await?)
    }
}
