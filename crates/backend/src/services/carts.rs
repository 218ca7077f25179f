//! Cart operations.
//!
//! Every item mutation routes through the aggregate maintainer before
//! returning, keeping `items_count`/`total_price` on the cart consistent
//! with its live items.

use serde_json::json;

use copperleaf_core::{CartId, CartItemId, Price, ProductId, UserId};

use super::aggregates::{AggregateMaintainer, LineParent};
use super::cascade::{CascadeOrchestrator, RootKind};
use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Cart, CartItem, Product, User};
use crate::store::{Filter, RecordStore, Records};
use crate::validate;

/// Input for adding a product line to a cart.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AddCartItemInput {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart service.
pub struct CartService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> CartService<'a> {
    /// Create a cart service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    fn maintainer(&self) -> AggregateMaintainer<'a> {
        AggregateMaintainer::new(self.store)
    }

    /// Create an empty cart for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user is absent, `Conflict` if the user
    /// already has a cart.
    pub async fn create(&self, user_id: UserId) -> Result<Cart, BackendError> {
        let _: User = fetch_required(self.records, user_id).await?;

        if self
            .records
            .find_first::<Cart>(&Filter::field("user_id", user_id))
            .await?
            .is_some()
        {
            return Err(BackendError::Conflict(format!(
                "user {user_id} already has a cart"
            )));
        }

        let cart = Cart {
            id: CartId::generate(),
            user_id,
            items_count: 0,
            total_price: Price::ZERO,
        };
        self.records.create(&cart).await?;
        Ok(cart)
    }

    /// Fetch a cart by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: CartId) -> Result<Cart, BackendError> {
        fetch_required(self.records, id).await
    }

    /// The user's cart, if one exists. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, BackendError> {
        Ok(self
            .records
            .find_first::<Cart>(&Filter::field("user_id", user_id))
            .await?)
    }

    /// Items of one cart.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("cart_id", cart_id))
            .await?)
    }

    /// Add a product line to a cart. The line total is quantity x the
    /// product's unit price at time of entry.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero quantity, `NotFound` if the cart or
    /// product is absent.
    pub async fn add_item(&self, input: AddCartItemInput) -> Result<CartItem, BackendError> {
        validate::require_min("quantity", input.quantity, 1)?;
        let cart: Cart = fetch_required(self.records, input.cart_id).await?;
        let product: Product = fetch_required(self.records, input.product_id).await?;

        let item = CartItem {
            id: CartItemId::generate(),
            cart_id: cart.id,
            product_id: product.id,
            quantity: input.quantity,
            total_price: product.price.times(input.quantity),
        };
        self.records.create(&item).await?;

        self.maintainer()
            .reconcile(LineParent::Cart(cart.id))
            .await?;
        Ok(item)
    }

    /// Change a line's quantity, recomputing its total from the product's
    /// current unit price.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero quantity, `NotFound` if the item or
    /// its product is absent.
    pub async fn update_item(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        validate::require_min("quantity", quantity, 1)?;
        let item: CartItem = fetch_required(self.records, id).await?;
        let product: Product = fetch_required(self.records, item.product_id).await?;

        let updated = self
            .records
            .update::<CartItem>(
                id,
                json!({
                    "quantity": quantity,
                    "total_price": product.price.times(quantity),
                }),
            )
            .await?
            .ok_or(BackendError::not_found("cart_item"))?;

        self.maintainer()
            .reconcile(LineParent::Cart(item.cart_id))
            .await?;
        Ok(updated)
    }

    /// Remove a line from its cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is absent.
    pub async fn remove_item(&self, id: CartItemId) -> Result<CartItem, BackendError> {
        let removed = self
            .records
            .delete::<CartItem>(id)
            .await?
            .ok_or(BackendError::not_found("cart_item"))?;

        self.maintainer()
            .reconcile(LineParent::Cart(removed.cart_id))
            .await?;
        Ok(removed)
    }

    /// Delete a cart and its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: CartId) -> Result<Cart, BackendError> {
        Ok(CascadeOrchestrator::new(self.store).delete_cart(id).await?)
    }

    /// Delete every cart and every cart item.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::Cart)
            .await?)
    }
}
