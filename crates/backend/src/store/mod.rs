//! Record Store contract.
//!
//! The physical storage engine is an external collaborator consumed through
//! the [`RecordStore`] trait: plain create/read/update/delete plus
//! filtered-query primitives over JSON documents, with no cross-entity
//! cascades and no computed columns. Everything relational about this
//! application (cascading deletes, derived aggregates) lives above this
//! trait, in the services layer.
//!
//! Two implementations ship with the crate: [`memory::MemoryStore`] for tests
//! and [`postgres::PostgresStore`] for production.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Entity kinds known to the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    User,
    Admin,
    Brand,
    Category,
    Product,
    Address,
    Cart,
    CartItem,
    Order,
    OrderItem,
    WishList,
    WishListItem,
    Review,
}

impl RecordKind {
    /// Stable storage name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Brand => "brand",
            Self::Category => "category",
            Self::Product => "product",
            Self::Address => "address",
            Self::Cart => "cart",
            Self::CartItem => "cart_item",
            Self::Order => "order",
            Self::OrderItem => "order_item",
            Self::WishList => "wish_list",
            Self::WishListItem => "wish_list_item",
            Self::Review => "review",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key collision (e.g., duplicate id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Top-level equality filter over record fields.
///
/// Every condition must match for a record to be selected; an empty filter
/// selects the whole collection.
#[derive(Debug, Clone, Default)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Filter matching every record of the kind.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter with a single field-equality condition.
    #[must_use]
    pub fn field(name: &str, value: impl Serialize) -> Self {
        Self::default().and(name, value)
    }

    /// Add a further field-equality condition.
    #[must_use]
    pub fn and(mut self, name: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(name.to_owned(), value);
        self
    }

    /// Whether the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a record satisfies every condition.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.0.iter().all(|(name, value)| record.get(name) == Some(value))
    }

    /// The filter as a JSON object (used for JSONB containment queries).
    #[must_use]
    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// The record store contract.
///
/// Each operation completes or fails as a single unit from this layer's
/// perspective; there is no multi-operation transaction support. `update`
/// merges the top-level keys of an object patch into the stored document and
/// returns the updated document, or `None` if the record is absent. `delete`
/// returns the removed document, or `None` if the record was already absent.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record.
    async fn insert(&self, kind: RecordKind, id: Uuid, data: Value) -> Result<(), StoreError>;

    /// Point lookup by id.
    async fn find_unique(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Fetch every record of the kind matching the filter.
    async fn find_many(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Merge an object patch into the record, returning the updated document.
    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError>;

    /// Delete a record, returning the removed document.
    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Delete every record of the kind matching the filter, returning the
    /// number of records removed.
    async fn delete_many(&self, kind: RecordKind, filter: &Filter) -> Result<u64, StoreError>;
}

/// A persistable entity.
pub trait Record: Serialize + DeserializeOwned + Send {
    /// The store kind this entity persists under.
    const KIND: RecordKind;

    /// The entity's primary key.
    fn record_id(&self) -> Uuid;
}

/// Typed convenience handle over a [`RecordStore`].
///
/// Converts between entity structs and the store's JSON documents so the
/// services layer never touches raw [`Value`]s for whole records.
#[derive(Clone, Copy)]
pub struct Records<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> Records<'a> {
    /// Wrap a record store.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Persist a new entity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` on id collision.
    pub async fn create<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let data = serde_json::to_value(record)?;
        self.store.insert(R::KIND, record.record_id(), data).await
    }

    /// Point lookup by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the stored document does
    /// not deserialize.
    pub async fn find<R: Record>(&self, id: impl Into<Uuid>) -> Result<Option<R>, StoreError> {
        match self.store.find_unique(R::KIND, id.into()).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Fetch every entity matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a stored document does not
    /// deserialize.
    pub async fn find_many<R: Record>(&self, filter: &Filter) -> Result<Vec<R>, StoreError> {
        self.store
            .find_many(R::KIND, filter)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    /// Point query: the first entity matching the filter, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the stored document does
    /// not deserialize.
    pub async fn find_first<R: Record>(&self, filter: &Filter) -> Result<Option<R>, StoreError> {
        Ok(self.find_many::<R>(filter).await?.into_iter().next())
    }

    /// Merge an object patch into the entity, returning the updated entity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails or the updated document does
    /// not deserialize.
    pub async fn update<R: Record>(
        &self,
        id: impl Into<Uuid>,
        patch: Value,
    ) -> Result<Option<R>, StoreError> {
        match self.store.update(R::KIND, id.into(), patch).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Delete an entity, returning the removed entity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails or the removed document does
    /// not deserialize.
    pub async fn delete<R: Record>(&self, id: impl Into<Uuid>) -> Result<Option<R>, StoreError> {
        match self.store.delete(R::KIND, id.into()).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Delete every entity matching the filter, returning the count removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete_many<R: Record>(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.store.delete_many(R::KIND, filter).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches() {
        let record = json!({"user_id": "u1", "default": true, "city": "Leiden"});

        assert!(Filter::all().matches(&record));
        assert!(Filter::field("user_id", "u1").matches(&record));
        assert!(
            Filter::field("user_id", "u1")
                .and("default", true)
                .matches(&record)
        );
        assert!(!Filter::field("user_id", "u2").matches(&record));
        assert!(!Filter::field("missing", "x").matches(&record));
    }

    #[test]
    fn test_filter_as_json() {
        let filter = Filter::field("cart_id", "c1").and("quantity", 2);
        assert_eq!(filter.as_json(), json!({"cart_id": "c1", "quantity": 2}));
    }

    #[test]
    fn test_record_kind_names_are_unique() {
        let kinds = [
            RecordKind::User,
            RecordKind::Admin,
            RecordKind::Brand,
            RecordKind::Category,
            RecordKind::Product,
            RecordKind::Address,
            RecordKind::Cart,
            RecordKind::CartItem,
            RecordKind::Order,
            RecordKind::OrderItem,
            RecordKind::WishList,
            RecordKind::WishListItem,
            RecordKind::Review,
        ];
        let names: std::collections::HashSet<_> = kinds.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), kinds.len());
    }
}
