//! In-memory record store.
//!
//! Backs unit and integration tests; behaves like the Postgres store minus
//! durability. Iteration order is by id, which keeps test output stable.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, RecordKind, RecordStore, StoreError};

type Collections = HashMap<RecordKind, BTreeMap<Uuid, Value>>;

/// In-memory [`RecordStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, kind: RecordKind, id: Uuid, data: Value) -> Result<(), StoreError> {
        let mut collections = self.write();
        let collection = collections.entry(kind).or_default();
        if collection.contains_key(&id) {
            return Err(StoreError::Conflict(format!("duplicate {kind} id {id}")));
        }
        collection.insert(id, data);
        Ok(())
    }

    async fn find_unique(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read()
            .get(&kind)
            .and_then(|collection| collection.get(&id))
            .cloned())
    }

    async fn find_many(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .read()
            .get(&kind)
            .map(|collection| {
                collection
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let mut collections = self.write();
        let Some(record) = collections
            .get_mut(&kind)
            .and_then(|collection| collection.get_mut(&id))
        else {
            return Ok(None);
        };

        match patch {
            Value::Object(patch_fields) if record.is_object() => {
                if let Some(fields) = record.as_object_mut() {
                    fields.extend(patch_fields);
                }
            }
            // Non-object patches replace the whole document, matching
            // jsonb concatenation semantics closely enough for tests.
            other => *record = other,
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        Ok(self
            .write()
            .get_mut(&kind)
            .and_then(|collection| collection.remove(&id)))
    }

    async fn delete_many(&self, kind: RecordKind, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.write();
        let Some(collection) = collections.get_mut(&kind) else {
            return Ok(0);
        };
        let before = collection.len();
        collection.retain(|_, record| !filter.matches(record));
        Ok((before - collection.len()) as u64)
    }
}
