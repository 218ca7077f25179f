//! Aggregate maintenance for derived parent fields.
//!
//! `items_count` and `total_price` on carts and orders are stored fields the
//! record store cannot compute. After every line-item create/update/delete
//! the maintainer re-reads *all* current children and writes both sums back.
//! Recompute-from-scratch is self-healing: any transient drift is corrected
//! on the next mutation, at the cost of an O(children) read per mutation and
//! a read-then-write race window between concurrent mutations on the same
//! parent (last write wins; there is no locking in this layer).

use serde_json::json;

use copperleaf_core::{AddressId, CartId, OrderId, Price, ProductId, UserId};

use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Address, Cart, CartItem, Order, OrderItem, Product};
use crate::store::{Filter, RecordStore, Records};

/// A parent whose derived fields need recomputing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineParent {
    Cart(CartId),
    Order(OrderId),
}

/// Recomputes and persists derived fields.
pub struct AggregateMaintainer<'a> {
    records: Records<'a>,
}

impl<'a> AggregateMaintainer<'a> {
    /// Create a maintainer over the record store.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Re-read the parent's children and write back
    /// `items_count = Σ quantity` and `total_price = Σ total_price`.
    ///
    /// Call with the triggering mutation already persisted (new item created,
    /// item patch applied, or old item removed).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the parent is absent, or a store error if a
    /// read/write fails.
    pub async fn reconcile(&self, parent: LineParent) -> Result<(), BackendError> {
        let (items_count, total_price) = match parent {
            LineParent::Cart(id) => {
                let items: Vec<CartItem> = self
                    .records
                    .find_many(&Filter::field("cart_id", id))
                    .await?;
                let sums = sums(items.iter().map(|i| (i.quantity, i.total_price)));
                self.records
                    .update::<Cart>(id, json!({"items_count": sums.0, "total_price": sums.1}))
                    .await?
                    .ok_or(BackendError::not_found("cart"))?;
                sums
            }
            LineParent::Order(id) => {
                let items: Vec<OrderItem> = self
                    .records
                    .find_many(&Filter::field("order_id", id))
                    .await?;
                let sums = sums(items.iter().map(|i| (i.quantity, i.total_price)));
                self.records
                    .update::<Order>(id, json!({"items_count": sums.0, "total_price": sums.1}))
                    .await?
                    .ok_or(BackendError::not_found("order"))?;
                sums
            }
        };

        tracing::debug!(?parent, items_count, %total_price, "aggregates reconciled");
        Ok(())
    }

    /// Apply a stock delta to a product: positive debits stock (item created
    /// or grown), negative restores it (item shrunk).
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the debit would drive stock negative, `NotFound`
    /// if the product is absent.
    pub async fn apply_stock_delta(
        &self,
        product_id: ProductId,
        delta: i64,
    ) -> Result<(), BackendError> {
        let product: Product = fetch_required(self.records, product_id).await?;
        let remaining = i64::from(product.stock) - delta;
        if remaining < 0 {
            return Err(BackendError::Conflict(format!(
                "insufficient stock for product {product_id}: {} on hand, {delta} requested",
                product.stock
            )));
        }
        let stock = u32::try_from(remaining).map_err(|_| {
            BackendError::Conflict(format!("stock overflow for product {product_id}"))
        })?;

        self.records
            .update::<Product>(product_id, json!({"stock": stock}))
            .await?
            .ok_or(BackendError::not_found("product"))?;
        Ok(())
    }

    /// Unset `default` on every address of the user except `keep`.
    ///
    /// This is the unset-all half of the default-address exclusivity rule;
    /// the caller then writes the one default row. The two writes are not
    /// atomic (same race caveat as `reconcile`).
    ///
    /// # Errors
    ///
    /// Returns a store error if a read/write fails.
    pub async fn clear_other_defaults(
        &self,
        user_id: UserId,
        keep: Option<AddressId>,
    ) -> Result<(), BackendError> {
        let defaults: Vec<Address> = self
            .records
            .find_many(&Filter::field("user_id", user_id).and("default", true))
            .await?;

        for address in defaults {
            if Some(address.id) == keep {
                continue;
            }
            self.records
                .update::<Address>(address.id, json!({"default": false}))
                .await?;
        }
        Ok(())
    }
}

fn sums(items: impl Iterator<Item = (u32, Price)>) -> (u32, Price) {
    items.fold((0, Price::ZERO), |(count, total), (quantity, price)| {
        (count + quantity, total + price)
    })
}
