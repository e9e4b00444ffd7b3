//! Object storage port - binary uploads with public retrieval URLs.

use async_trait::async_trait;

/// An object stored under a bucket-scoped key.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    /// Public URL the stored bytes can be fetched from.
    pub url: String,
}

/// Write/delete access to the external object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under `key` and return the stored object with its
    /// public URL.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Delete the object under `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Recover the storage key from a public URL previously returned by
    /// `put`, if the URL belongs to this store. Used for best-effort
    /// cleanup of replaced or deleted images.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Storage not configured: {0}")]
    Config(String),
}
