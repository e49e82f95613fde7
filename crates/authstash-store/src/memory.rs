use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectClient;

type ObjectKey = (String, String);

/// In-memory, HashMap-based object client.
///
/// Intended for tests and embedding. Objects are held behind a `RwLock` and
/// cloned on read/write. Individual keys can be made to fail every request
/// with [`InMemoryObjectClient::fail_key`] to simulate a transient outage.
pub struct InMemoryObjectClient {
    objects: RwLock<HashMap<ObjectKey, Vec<u8>>>,
    failing: RwLock<HashSet<String>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryObjectClient {
    /// Create a new empty client.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            puts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Peek at an object without going through the async interface.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Returns `true` if the object exists.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.object(bucket, key).is_some()
    }

    /// Sorted keys of every object in `bucket`.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Store raw bytes directly, bypassing fault injection.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    /// Make every request for `key` fail until [`heal_key`](Self::heal_key).
    pub fn fail_key(&self, key: &str) {
        self.failing
            .write()
            .expect("lock poisoned")
            .insert(key.to_string());
    }

    /// Stop failing requests for `key`.
    pub fn heal_key(&self, key: &str) {
        self.failing.write().expect("lock poisoned").remove(key);
    }

    /// Number of successful `put_object` calls.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of successful `delete_object` calls.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self.failing.read().expect("lock poisoned").contains(key) {
            return Err(StoreError::Backend {
                location: key.to_string(),
                message: "injected failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryObjectClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectClient for InMemoryObjectClient {
    async fn fetch_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check(key)?;
        Ok(self.object(bucket, key))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StoreResult<()> {
        self.check(key)?;
        self.insert(bucket, key, body);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.check(key)?;
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(&(bucket.to_string(), key.to_string()));
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectClient")
            .field("object_count", &self.len())
            .finish()
    }
}
