//! Wish list operations.

use copperleaf_core::{ProductId, UserId, WishListId, WishListItemId};

use super::cascade::{CascadeOrchestrator, RootKind};
use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Product, User, WishList, WishListItem};
use crate::store::{Filter, RecordStore, Records};

/// Wish list service.
pub struct WishListService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> WishListService<'a> {
    /// Create a wish list service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create a wish list for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user is absent, `Conflict` if the user
    /// already has a wish list.
    pub async fn create(&self, user_id: UserId) -> Result<WishList, BackendError> {
        let _: User = fetch_required(self.records, user_id).await?;

        if self
            .records
            .find_first::<WishList>(&Filter::field("user_id", user_id))
            .await?
            .is_some()
        {
            return Err(BackendError::Conflict(format!(
                "user {user_id} already has a wish list"
            )));
        }

        let list = WishList {
            id: WishListId::generate(),
            user_id,
        };
        self.records.create(&list).await?;
        Ok(list)
    }

    /// Fetch a wish list by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: WishListId) -> Result<WishList, BackendError> {
        fetch_required(self.records, id).await
    }

    /// The user's wish list, if one exists. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<WishList>, BackendError> {
        Ok(self
            .records
            .find_first::<WishList>(&Filter::field("user_id", user_id))
            .await?)
    }

    /// Items of one wish list.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn items(&self, list_id: WishListId) -> Result<Vec<WishListItem>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("wish_list_id", list_id))
            .await?)
    }

    /// Add a product to a wish list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list or product is absent, `Conflict` if
    /// the product is already on the list.
    pub async fn add_item(
        &self,
        list_id: WishListId,
        product_id: ProductId,
    ) -> Result<WishListItem, BackendError> {
        let list: WishList = fetch_required(self.records, list_id).await?;
        let product: Product = fetch_required(self.records, product_id).await?;

        if self
            .records
            .find_first::<WishListItem>(
                &Filter::field("wish_list_id", list.id).and("product_id", product.id),
            )
            .await?
            .is_some()
        {
            return Err(BackendError::Conflict(format!(
                "product {product_id} is already on wish list {list_id}"
            )));
        }

        let item = WishListItem {
            id: WishListItemId::generate(),
            wish_list_id: list.id,
            product_id: product.id,
        };
        self.records.create(&item).await?;
        Ok(item)
    }

    /// Remove an item from its wish list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is absent.
    pub async fn remove_item(&self, id: WishListItemId) -> Result<WishListItem, BackendError> {
        self.records
            .delete::<WishListItem>(id)
            .await?
            .ok_or(BackendError::not_found("wish_list_item"))
    }

    /// Delete a wish list and its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: WishListId) -> Result<WishList, BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_wish_list(id)
            .await?)
    }

    /// Delete every wish list and every wish list item.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::WishList)
            .await?)
    }
}
