//! Image plumbing between records and the blob store.
//!
//! Records never go without an image URL: creation seeds the per-kind
//! placeholder, upload swaps in the blob store's URL, and deleting an
//! owner's blobs writes the placeholder back.

use serde_json::json;
use uuid::Uuid;

use copperleaf_core::{AdminId, BrandId, CategoryId, ProductId, UserId};

use crate::blob::BlobStore;
use crate::error::BackendError;
use crate::models::{Admin, Brand, Category, Product, User};
use crate::store::{RecordStore, Records};
use crate::validate::{self, MAX_TEXT_LENGTH};

/// Default avatar for users and admins.
pub const USER_IMAGE_PLACEHOLDER: &str = "/static/images/profile-placeholder.png";

/// Default logo for brands and categories.
pub const BRAND_IMAGE_PLACEHOLDER: &str = "/static/images/collection-placeholder.png";

/// Default photo for products.
pub const PRODUCT_IMAGE_PLACEHOLDER: &str = "/static/images/product-placeholder.png";

/// The record an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    User(UserId),
    Admin(AdminId),
    Brand(BrandId),
    Category(CategoryId),
    Product(ProductId),
}

impl ImageOwner {
    /// Blob store owner key.
    #[must_use]
    pub const fn owner_id(self) -> Uuid {
        match self {
            Self::User(id) => id.as_uuid(),
            Self::Admin(id) => id.as_uuid(),
            Self::Brand(id) => id.as_uuid(),
            Self::Category(id) => id.as_uuid(),
            Self::Product(id) => id.as_uuid(),
        }
    }

    /// Placeholder URL restored when the owner's blobs are deleted.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::User(_) | Self::Admin(_) => USER_IMAGE_PLACEHOLDER,
            Self::Brand(_) | Self::Category(_) => BRAND_IMAGE_PLACEHOLDER,
            Self::Product(_) => PRODUCT_IMAGE_PLACEHOLDER,
        }
    }
}

/// Image service.
pub struct ImageService<'a> {
    records: Records<'a>,
    blobs: &'a dyn BlobStore,
}

impl<'a> ImageService<'a> {
    /// Create an image service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore, blobs: &'a dyn BlobStore) -> Self {
        Self {
            records: Records::new(store),
            blobs,
        }
    }

    /// Upload an image and record its URL on the owning record.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty filename, `NotFound` if the owner
    /// record is absent, `Blob` if the upload fails.
    pub async fn upload(
        &self,
        owner: ImageOwner,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        validate::require_text("filename", filename, MAX_TEXT_LENGTH)?;
        let url = self
            .blobs
            .upload(owner.owner_id(), filename, bytes, content_type)
            .await?;
        self.set_image_url(owner, &url).await?;

        tracing::debug!(owner = ?owner, url, "image uploaded");
        Ok(url)
    }

    /// URL of one of the owner's images, if present.
    ///
    /// # Errors
    ///
    /// Returns `Blob` if the lookup fails.
    pub async fn get(
        &self,
        owner: ImageOwner,
        filename: &str,
    ) -> Result<Option<String>, BackendError> {
        Ok(self.blobs.get(owner.owner_id(), filename).await?)
    }

    /// URLs of every image the owner has.
    ///
    /// # Errors
    ///
    /// Returns `Blob` if the lookup fails.
    pub async fn list(&self, owner: ImageOwner) -> Result<Vec<String>, BackendError> {
        Ok(self.blobs.list(owner.owner_id()).await?)
    }

    /// Delete the owner's blobs and write the per-kind placeholder URL back
    /// to the owning record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the owner record is absent, `Blob` if the
    /// delete fails.
    pub async fn remove(&self, owner: ImageOwner) -> Result<String, BackendError> {
        self.blobs.delete(owner.owner_id()).await?;
        let placeholder = owner.placeholder();
        self.set_image_url(owner, placeholder).await?;

        tracing::debug!(owner = ?owner, "image removed, placeholder restored");
        Ok(placeholder.to_owned())
    }

    async fn set_image_url(&self, owner: ImageOwner, url: &str) -> Result<(), BackendError> {
        let patch = json!({"image_url": url});
        match owner {
            ImageOwner::User(id) => {
                self.records
                    .update::<User>(id, patch)
                    .await?
                    .ok_or(BackendError::not_found("user"))?;
            }
            ImageOwner::Admin(id) => {
                self.records
                    .update::<Admin>(id, patch)
                    .await?
                    .ok_or(BackendError::not_found("admin"))?;
            }
            ImageOwner::Brand(id) => {
                self.records
                    .update::<Brand>(id, patch)
                    .await?
                    .ok_or(BackendError::not_found("brand"))?;
            }
            ImageOwner::Category(id) => {
                self.records
                    .update::<Category>(id, patch)
                    .await?
                    .ok_or(BackendError::not_found("category"))?;
            }
            ImageOwner::Product(id) => {
                self.records
                    .update::<Product>(id, patch)
                    .await?
                    .ok_or(BackendError::not_found("product"))?;
            }
        }
        Ok(())
    }
}
