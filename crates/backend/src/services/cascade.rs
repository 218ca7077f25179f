//! Cascading deletes for aggregate roots.
//!
//! The record store has no foreign keys, so deleting a root must remove its
//! full dependent subtree here, descendants first, root last. Steps run
//! sequentially with no surrounding transaction: a failing step aborts the
//! remainder and surfaces [`CascadeError::Failed`] naming the stage, and
//! prior deletions are not rolled back — a mid-sequence crash can leave
//! orphaned child rows with no automatic compensation.

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use copperleaf_core::{BrandId, CartId, CategoryId, OrderId, ProductId, UserId, WishListId};

use crate::models::{
    Address, Brand, Cart, CartItem, Category, Order, OrderItem, Product, Review, User, WishList,
    WishListItem,
};
use crate::store::{Filter, RecordStore, Records, StoreError};

/// Errors produced by the cascade orchestrator.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// The root record to delete does not exist.
    #[error("{kind} not found")]
    RootNotFound {
        /// Root entity kind.
        kind: &'static str,
    },

    /// A cascade step failed; remaining steps were aborted.
    #[error("cascade aborted at stage `{stage}`: {source}")]
    Failed {
        /// The stage that failed.
        stage: &'static str,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },

    /// The deleted root could not be serialized for the caller.
    #[error("cascade completed but root failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Attach a stage name to a store failure.
fn at(stage: &'static str) -> impl Fn(StoreError) -> CascadeError {
    move |source| CascadeError::Failed { stage, source }
}

/// Aggregate roots whose deletion cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    User,
    Product,
    Brand,
    Category,
    Cart,
    Order,
    WishList,
}

/// Deletes an aggregate root and every record that transitively depends on
/// it, leaving no orphans.
pub struct CascadeOrchestrator<'a> {
    records: Records<'a>,
}

impl<'a> CascadeOrchestrator<'a> {
    /// Create an orchestrator over the record store.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Delete a root by kind, returning the deleted record as a JSON
    /// document.
    ///
    /// # Errors
    ///
    /// Returns `RootNotFound` if the root is absent, or `Failed` naming the
    /// stage that errored.
    pub async fn delete_root(&self, kind: RootKind, id: Uuid) -> Result<Value, CascadeError> {
        let root = match kind {
            RootKind::User => serde_json::to_value(self.delete_user(UserId::new(id)).await?),
            RootKind::Product => {
                serde_json::to_value(self.delete_product(ProductId::new(id)).await?)
            }
            RootKind::Brand => serde_json::to_value(self.delete_brand(BrandId::new(id)).await?),
            RootKind::Category => {
                serde_json::to_value(self.delete_category(CategoryId::new(id)).await?)
            }
            RootKind::Cart => serde_json::to_value(self.delete_cart(CartId::new(id)).await?),
            RootKind::Order => serde_json::to_value(self.delete_order(OrderId::new(id)).await?),
            RootKind::WishList => {
                serde_json::to_value(self.delete_wish_list(WishListId::new(id)).await?)
            }
        }?;
        Ok(root)
    }

    /// Delete a user and everything the user owns: order items of the user's
    /// orders, the orders, the user's reviews and addresses, the wish list
    /// and its items (if one exists), the cart and its items (if one
    /// exists), then the user itself.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_user(&self, id: UserId) -> Result<User, CascadeError> {
        let user: User = self.require_root(id.as_uuid()).await?;
        let by_user = Filter::field("user_id", id);

        let orders: Vec<Order> = self
            .records
            .find_many(&by_user)
            .await
            .map_err(at("orders"))?;
        for order in &orders {
            self.records
                .delete_many::<OrderItem>(&Filter::field("order_id", order.id))
                .await
                .map_err(at("order_items"))?;
        }
        self.records
            .delete_many::<Order>(&by_user)
            .await
            .map_err(at("orders"))?;

        self.records
            .delete_many::<Review>(&by_user)
            .await
            .map_err(at("reviews"))?;
        self.records
            .delete_many::<Address>(&by_user)
            .await
            .map_err(at("addresses"))?;

        // Point query: a user without a wish list simply skips this branch.
        if let Some(list) = self
            .records
            .find_first::<WishList>(&by_user)
            .await
            .map_err(at("wish_list"))?
        {
            self.records
                .delete_many::<WishListItem>(&Filter::field("wish_list_id", list.id))
                .await
                .map_err(at("wish_list_items"))?;
            self.records
                .delete::<WishList>(list.id)
                .await
                .map_err(at("wish_list"))?;
        }

        if let Some(cart) = self
            .records
            .find_first::<Cart>(&by_user)
            .await
            .map_err(at("cart"))?
        {
            self.records
                .delete_many::<CartItem>(&Filter::field("cart_id", cart.id))
                .await
                .map_err(at("cart_items"))?;
            self.records
                .delete::<Cart>(cart.id)
                .await
                .map_err(at("cart"))?;
        }

        self.records
            .delete::<User>(id)
            .await
            .map_err(at("user"))?;

        tracing::info!(user_id = %id, orders = orders.len(), "user cascade complete");
        Ok(user)
    }

    /// Delete a product and every reference to it: wish-list items, order
    /// items, cart items, and reviews, then the product itself.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_product(&self, id: ProductId) -> Result<Product, CascadeError> {
        let product: Product = self.require_root(id.as_uuid()).await?;
        let by_product = Filter::field("product_id", id);

        self.records
            .delete_many::<WishListItem>(&by_product)
            .await
            .map_err(at("wish_list_items"))?;
        self.records
            .delete_many::<OrderItem>(&by_product)
            .await
            .map_err(at("order_items"))?;
        self.records
            .delete_many::<CartItem>(&by_product)
            .await
            .map_err(at("cart_items"))?;
        self.records
            .delete_many::<Review>(&by_product)
            .await
            .map_err(at("reviews"))?;

        self.records
            .delete::<Product>(id)
            .await
            .map_err(at("product"))?;

        tracing::info!(product_id = %id, "product cascade complete");
        Ok(product)
    }

    /// Delete a brand and its dependent products, each via the full product
    /// cascade.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_brand(&self, id: BrandId) -> Result<Brand, CascadeError> {
        let brand: Brand = self.require_root(id.as_uuid()).await?;

        let products: Vec<Product> = self
            .records
            .find_many(&Filter::field("brand_id", id))
            .await
            .map_err(at("products"))?;
        for product in products {
            self.delete_product(product.id).await?;
        }

        self.records
            .delete::<Brand>(id)
            .await
            .map_err(at("brand"))?;

        tracing::info!(brand_id = %id, "brand cascade complete");
        Ok(brand)
    }

    /// Delete a category and its dependent products, each via the full
    /// product cascade.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_category(&self, id: CategoryId) -> Result<Category, CascadeError> {
        let category: Category = self.require_root(id.as_uuid()).await?;

        let products: Vec<Product> = self
            .records
            .find_many(&Filter::field("category_id", id))
            .await
            .map_err(at("products"))?;
        for product in products {
            self.delete_product(product.id).await?;
        }

        self.records
            .delete::<Category>(id)
            .await
            .map_err(at("category"))?;

        tracing::info!(category_id = %id, "category cascade complete");
        Ok(category)
    }

    /// Delete a cart: its items, then the container.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_cart(&self, id: CartId) -> Result<Cart, CascadeError> {
        let cart: Cart = self.require_root(id.as_uuid()).await?;
        self.records
            .delete_many::<CartItem>(&Filter::field("cart_id", id))
            .await
            .map_err(at("cart_items"))?;
        self.records
            .delete::<Cart>(id)
            .await
            .map_err(at("cart"))?;
        Ok(cart)
    }

    /// Delete an order: its items, then the container.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_order(&self, id: OrderId) -> Result<Order, CascadeError> {
        let order: Order = self.require_root(id.as_uuid()).await?;
        self.records
            .delete_many::<OrderItem>(&Filter::field("order_id", id))
            .await
            .map_err(at("order_items"))?;
        self.records
            .delete::<Order>(id)
            .await
            .map_err(at("order"))?;
        Ok(order)
    }

    /// Delete a wish list: its items, then the container.
    ///
    /// # Errors
    ///
    /// See [`delete_root`](Self::delete_root).
    pub async fn delete_wish_list(&self, id: WishListId) -> Result<WishList, CascadeError> {
        let list: WishList = self.require_root(id.as_uuid()).await?;
        self.records
            .delete_many::<WishListItem>(&Filter::field("wish_list_id", id))
            .await
            .map_err(at("wish_list_items"))?;
        self.records
            .delete::<WishList>(id)
            .await
            .map_err(at("wish_list"))?;
        Ok(list)
    }

    /// Bulk variant: delete *every* root of the kind, one unfiltered batch
    /// per stage in the same dependency order as the per-root cascades.
    ///
    /// # Errors
    ///
    /// Returns `Failed` naming the stage that errored.
    pub async fn delete_all(&self, kind: RootKind) -> Result<(), CascadeError> {
        match kind {
            RootKind::User => {
                self.wipe::<OrderItem>("order_items").await?;
                self.wipe::<Order>("orders").await?;
                self.wipe::<Review>("reviews").await?;
                self.wipe::<Address>("addresses").await?;
                self.wipe::<WishListItem>("wish_list_items").await?;
                self.wipe::<WishList>("wish_lists").await?;
                self.wipe::<CartItem>("cart_items").await?;
                self.wipe::<Cart>("carts").await?;
                self.wipe::<User>("users").await?;
            }
            RootKind::Product => {
                self.wipe::<WishListItem>("wish_list_items").await?;
                self.wipe::<OrderItem>("order_items").await?;
                self.wipe::<CartItem>("cart_items").await?;
                self.wipe::<Review>("reviews").await?;
                self.wipe::<Product>("products").await?;
            }
            RootKind::Brand => {
                Box::pin(self.delete_all(RootKind::Product)).await?;
                self.wipe::<Brand>("brands").await?;
            }
            RootKind::Category => {
                Box::pin(self.delete_all(RootKind::Product)).await?;
                self.wipe::<Category>("categories").await?;
            }
            RootKind::Cart => {
                self.wipe::<CartItem>("cart_items").await?;
                self.wipe::<Cart>("carts").await?;
            }
            RootKind::Order => {
                self.wipe::<OrderItem>("order_items").await?;
                self.wipe::<Order>("orders").await?;
            }
            RootKind::WishList => {
                self.wipe::<WishListItem>("wish_list_items").await?;
                self.wipe::<WishList>("wish_lists").await?;
            }
        }
        tracing::info!(?kind, "bulk cascade complete");
        Ok(())
    }

    async fn wipe<R: crate::store::Record>(&self, stage: &'static str) -> Result<(), CascadeError> {
        self.records
            .delete_many::<R>(&Filter::all())
            .await
            .map_err(at(stage))?;
        Ok(())
    }

    /// Resolve the root before any descendant is touched, so a nonexistent
    /// root never triggers a partial cascade.
    async fn require_root<R: crate::store::Record>(&self, id: Uuid) -> Result<R, CascadeError> {
        self.records
            .find::<R>(id)
            .await
            .map_err(at("root"))?
            .ok_or(CascadeError::RootNotFound {
                kind: R::KIND.as_str(),
            })
    }
}
