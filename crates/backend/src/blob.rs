//! Blob Store contract.
//!
//! Binary objects (product photos, avatars, logos) live with an external
//! content-addressable host, keyed by owner id + filename. This layer only
//! consumes the [`BlobStore`] trait and records the returned URLs; the
//! placeholder write-back on delete lives in
//! [`services::images`](crate::services::images).

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during blob store operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The hosting backend failed.
    #[error("blob backend error: {0}")]
    Backend(String),
}

/// The blob store contract.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object and return its public URL.
    async fn upload(
        &self,
        owner: Uuid,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError>;

    /// URL of a stored object, if present.
    async fn get(&self, owner: Uuid, filename: &str) -> Result<Option<String>, BlobError>;

    /// Remove every object belonging to the owner. Removing an absent owner
    /// is a no-op.
    async fn delete(&self, owner: Uuid) -> Result<(), BlobError>;

    /// URLs of every object belonging to the owner.
    async fn list(&self, owner: Uuid) -> Result<Vec<String>, BlobError>;
}

#[derive(Debug)]
#[allow(dead_code)] // payload is held, not served; URLs are the read surface
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

type Objects = HashMap<Uuid, BTreeMap<String, StoredBlob>>;

/// In-memory [`BlobStore`] used by tests and local development.
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: RwLock<Objects>,
}

impl MemoryBlobStore {
    /// Create a store serving URLs under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn url_for(&self, owner: Uuid, filename: &str) -> String {
        format!("{}/{owner}/{filename}", self.base_url)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        owner: Uuid,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError> {
        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        objects.entry(owner).or_default().insert(
            filename.to_owned(),
            StoredBlob {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(self.url_for(owner, filename))
    }

    async fn get(&self, owner: Uuid, filename: &str) -> Result<Option<String>, BlobError> {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(objects
            .get(&owner)
            .and_then(|files| files.get(filename))
            .map(|_| self.url_for(owner, filename)))
    }

    async fn delete(&self, owner: Uuid) -> Result<(), BlobError> {
        let mut objects = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        objects.remove(&owner);
        Ok(())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<String>, BlobError> {
        let objects = self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(objects
            .get(&owner)
            .map(|files| {
                files
                    .keys()
                    .map(|filename| self.url_for(owner, filename))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_get_list_delete() {
        let store = MemoryBlobStore::new("https://media.test");
        let owner = Uuid::new_v4();

        let url = store
            .upload(owner, "photo.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(url, format!("https://media.test/{owner}/photo.jpg"));

        assert_eq!(store.get(owner, "photo.jpg").await.unwrap(), Some(url));
        assert!(store.get(owner, "missing.jpg").await.unwrap().is_none());

        store
            .upload(owner, "alt.jpg", vec![4], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(store.list(owner).await.unwrap().len(), 2);

        store.delete(owner).await.unwrap();
        assert!(store.list(owner).await.unwrap().is_empty());

        // Deleting an absent owner is a no-op.
        store.delete(owner).await.unwrap();
    }
}
