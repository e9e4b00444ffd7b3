//! In-memory object store, used when S3 is not configured.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use lumen_core::ports::{ObjectStore, StorageError, StoredObject};

const BASE_URL: &str = "memory://objects";

/// Keeps uploaded bytes in a process-local map. URLs it hands out are not
/// actually fetchable; this exists so the rest of the system can run
/// without cloud credentials.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Upload("store poisoned".to_string()))?;
        objects.insert(key.to_string(), (bytes, content_type.to_string()));

        Ok(StoredObject {
            key: key.to_string(),
            url: format!("{BASE_URL}/{key}"),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Delete("store poisoned".to_string()))?;
        objects.remove(key);

        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(BASE_URL)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }
}
