use async_trait::async_trait;

use crate::errors::StoreError;

/// Write-only blob storage, addressed by a location (bucket) and a key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(&self, location: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;
}
