use async_trait::async_trait;

use crate::error::StoreResult;

/// Network client for a remote object store.
///
/// This is the boundary to the object-storage service; authentication,
/// transport security and request timeouts belong to the implementation.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Fetch an object. Returns `Ok(None)` if the object does not exist.
    async fn fetch_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or overwrite an object.
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StoreResult<()>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;
}

/// Storage for the serialized text of named records.
///
/// `name` is the flattened record name (`creds`, `pre-key-5`, ...); the
/// backend normalizes it and derives its own location.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Human-readable location of `name`, or `None` if `name` is empty.
    fn location(&self, name: &str) -> Option<String>;

    /// Read a record. Returns `Ok(None)` if it does not exist.
    async fn get(&self, name: &str) -> StoreResult<Option<String>>;

    /// Create or overwrite a record.
    async fn put(&self, name: &str, text: &str) -> StoreResult<()>;

    /// Delete a record. Deleting a missing record succeeds.
    async fn delete(&self, name: &str) -> StoreResult<()>;
}
