//! S3-backed object store.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use lumen_core::ports::{ObjectStore, StorageError, StoredObject};

/// S3 configuration.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Base URL objects are publicly served from (CDN or bucket endpoint).
    pub base_url: String,
}

impl S3Config {
    /// Load S3 configuration from environment variables. `None` when no
    /// bucket is configured.
    pub fn from_env() -> Option<Self> {
        let bucket = std::env::var("S3_BUCKET").ok()?;
        let base_url = std::env::var("S3_BASE_URL")
            .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));

        Some(Self { bucket, base_url })
    }
}

/// Object store on AWS S3. Region and credentials come from the standard
/// AWS environment/config chain.
pub struct S3ObjectStore {
    client: Arc<Client>,
    config: S3Config,
}

impl S3ObjectStore {
    pub async fn new(config: S3Config) -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self {
            client: Arc::new(Client::new(&aws_config)),
            config,
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.config.base_url.trim_end_matches('/'))
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }
}
