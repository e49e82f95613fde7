use std::sync::Arc;

use async_trait::async_trait;
use authstash_types::{ObjectLocation, SessionId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ObjectClient, RecordBackend};

/// Durable record backend on a remote object store.
///
/// Records live at `<bucket>/sessions/<sessionId>-<name>.json` inside
/// `bucket`. Writes are unconditional upserts.
#[derive(Clone)]
pub struct ObjectStoreBackend {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    session: SessionId,
}

impl ObjectStoreBackend {
    pub fn new(client: Arc<dyn ObjectClient>, bucket: impl Into<String>, session: SessionId) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            session,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn resolve(&self, name: &str) -> StoreResult<ObjectLocation> {
        ObjectLocation::compose(&self.bucket, &self.session, name).ok_or(StoreError::EmptyKey)
    }
}

#[async_trait]
impl RecordBackend for ObjectStoreBackend {
    fn location(&self, name: &str) -> Option<String> {
        self.resolve(name).ok().map(|loc| loc.key().to_string())
    }

    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        let loc = self.resolve(name)?;
        let Some(body) = self.client.fetch_object(loc.bucket(), loc.key()).await? else {
            debug!(location = %loc, "object absent");
            return Ok(None);
        };
        let text = String::from_utf8(body).map_err(|_| StoreError::InvalidUtf8 {
            location: loc.to_string(),
        })?;
        debug!(location = %loc, bytes = text.len(), "object read");
        Ok(Some(text))
    }

    async fn put(&self, name: &str, text: &str) -> StoreResult<()> {
        let loc = self.resolve(name)?;
        self.client
            .put_object(loc.bucket(), loc.key(), text.as_bytes().to_vec())
            .await?;
        debug!(location = %loc, bytes = text.len(), "object written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        let loc = self.resolve(name)?;
        self.client.delete_object(loc.bucket(), loc.key()).await?;
        debug!(location = %loc, "object deleted");
        Ok(())
    }
}

impl std::fmt::Debug for ObjectStoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreBackend")
            .field("bucket", &self.bucket)
            .field("session", &self.session)
            .finish()
    }
}
