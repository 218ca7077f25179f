//! Order operations.
//!
//! Orders follow the cart aggregate rules, plus stock accounting: creating
//! or growing a line debits `Product::stock` by the quantity delta.
//! Deleting a line deliberately does *not* restock.

use serde_json::json;

use copperleaf_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::aggregates::{AggregateMaintainer, LineParent};
use super::cascade::{CascadeOrchestrator, RootKind};
use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Order, OrderItem, Product, User};
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, ValidationError};

/// One product line of an order request.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Input for placing an order.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateOrderInput {
    pub user_id: UserId,
    pub items: Vec<OrderLineInput>,
}

impl CreateOrderInput {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Empty { field: "items" });
        }
        for line in &self.items {
            validate::require_min("quantity", line.quantity, 1)?;
        }
        Ok(())
    }
}

/// Order service.
pub struct OrderService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> OrderService<'a> {
    /// Create an order service.
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

    /// Place an order for an existing user.
    ///
    /// Each line debits the product's stock by its quantity; the order's
    /// aggregates are reconciled once after all lines are in.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty order or zero quantities,
    /// `NotFound` for a missing user/product, `Conflict` if any line would
    /// drive stock negative. A conflict partway leaves earlier lines
    /// persisted (no rollback in this layer).
    pub async fn create(&self, input: CreateOrderInput) -> Result<Order, BackendError> {
        input.validate()?;
        let _: User = fetch_required(self.records, input.user_id).await?;

        let order = Order {
            id: OrderId::generate(),
            user_id: input.user_id,
            items_count: 0,
            total_price: Price::ZERO,
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now(),
        };
        self.records.create(&order).await?;

        for line in &input.items {
            self.insert_line(order.id, line).await?;
        }

        self.maintainer()
            .reconcile(LineParent::Order(order.id))
            .await?;

        let placed = fetch_required(self.records, order.id).await?;
        tracing::info!(order_id = %order.id, lines = input.items.len(), "order placed");
        Ok(placed)
    }

    /// Add a line to an existing order.
    ///
    /// # Errors
    ///
    /// Same contract as each line of [`create`](Self::create).
    pub async fn add_item(
        &self,
        order_id: OrderId,
        line: OrderLineInput,
    ) -> Result<OrderItem, BackendError> {
        validate::require_min("quantity", line.quantity, 1)?;
        let _: Order = fetch_required(self.records, order_id).await?;

        let item = self.insert_line(order_id, &line).await?;
        self.maintainer()
            .reconcile(LineParent::Order(order_id))
            .await?;
        Ok(item)
    }

    /// Change a line's quantity. Stock moves by the delta (new − old): a
    /// grown line debits more stock, a shrunk line restores the difference.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero quantity, `NotFound` for a missing
    /// item/product, `Conflict` on insufficient stock.
    pub async fn update_item(
        &self,
        id: OrderItemId,
        quantity: u32,
    ) -> Result<OrderItem, BackendError> {
        validate::require_min("quantity", quantity, 1)?;
        let item: OrderItem = fetch_required(self.records, id).await?;

        let delta = i64::from(quantity) - i64::from(item.quantity);
        self.maintainer()
            .apply_stock_delta(item.product_id, delta)
            .await?;

        let product: Product = fetch_required(self.records, item.product_id).await?;
        let updated = self
            .records
            .update::<OrderItem>(
                id,
                json!({
                    "quantity": quantity,
                    "total_price": product.price.times(quantity),
                }),
            )
            .await?
            .ok_or(BackendError::not_found("order_item"))?;

        self.maintainer()
            .reconcile(LineParent::Order(item.order_id))
            .await?;
        Ok(updated)
    }

    /// Remove a line from its order. Stock is not restored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is absent.
    pub async fn remove_item(&self, id: OrderItemId) -> Result<OrderItem, BackendError> {
        let removed = self
            .records
            .delete::<OrderItem>(id)
            .await?
            .ok_or(BackendError::not_found("order_item"))?;

        self.maintainer()
            .reconcile(LineParent::Order(removed.order_id))
            .await?;
        Ok(removed)
    }

    /// Move an order to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is absent.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        self.records
            .update::<Order>(id, json!({"status": status}))
            .await?
            .ok_or(BackendError::not_found("order"))
    }

    /// Fetch an order by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Order, BackendError> {
        fetch_required(self.records, id).await
    }

    /// Items of one order.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("order_id", order_id))
            .await?)
    }

    /// All orders.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// All orders of one user.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("user_id", user_id))
            .await?)
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: OrderId) -> Result<Order, BackendError> {
        Ok(CascadeOrchestrator::new(self.store).delete_order(id).await?)
    }

    /// Delete every order and every order item.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::Order)
            .await?)
    }

    /// Persist one line: debit stock, then write the item priced at the
    /// product's current unit price.
    async fn insert_line(
        &self,
        order_id: OrderId,
        line: &OrderLineInput,
    ) -> Result<OrderItem, BackendError> {
        let product: Product = fetch_required(self.records, line.product_id).await?;
        self.maintainer()
            .apply_stock_delta(line.product_id, i64::from(line.quantity))
            .await?;

        let item = OrderItem {
            id: OrderItemId::generate(),
            order_id,
            product_id: product.id,
            quantity: line.quantity,
            total_price: product.price.times(line.quantity),
        };
        self.records.create(&item).await?;
        Ok(item)
    }
}
