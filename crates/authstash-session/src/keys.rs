use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use authstash_codec::{decode, encode, from_record_value, to_record_value, RecordValue};
use authstash_crypto::AuthCredentials;
use authstash_store::{LocalFileBackend, ObjectClient, ObjectStoreBackend, RecordBackend};
use authstash_types::{KeyCategory, RecordKey};
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::app_state::AppStateSyncKeyData;
use crate::config::{SessionConfig, StorageMode};
use crate::error::{KeyFailure, SessionError, SessionResult};
use crate::mutation::{Mutation, MutationBatch};

/// A loaded record.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyData {
    /// Any record, as decoded.
    Value(RecordValue),
    /// A record of the `app-state-sync-key` category.
    AppStateSyncKey(AppStateSyncKeyData),
}

impl KeyData {
    pub fn as_value(&self) -> Option<&RecordValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::AppStateSyncKey(_) => None,
        }
    }

    pub fn as_app_state_sync_key(&self) -> Option<&AppStateSyncKeyData> {
        match self {
            Self::AppStateSyncKey(k) => Some(k),
            Self::Value(_) => None,
        }
    }
}

impl From<KeyData> for RecordValue {
    fn from(data: KeyData) -> Self {
        match data {
            KeyData::Value(v) => v,
            KeyData::AppStateSyncKey(k) => k.to_record(),
        }
    }
}

/// Per-id outcome of a batch load: `Ok(None)` when the record is absent.
pub type LoadResult = SessionResult<Option<KeyData>>;

/// Batch key-value interface consumed by the protocol client.
#[async_trait]
pub trait SignalKeyStore: Send + Sync {
    /// Load every id of `category`.
    ///
    /// Each id resolves independently. A missing record, or one that could
    /// not be fetched because the backend failed, resolves to `Ok(None)`; a
    /// corrupt record resolves to `Err` for that id only.
    async fn load(&self, category: KeyCategory, ids: &[String]) -> BTreeMap<String, LoadResult>;

    /// Apply every mutation of `batch` concurrently.
    ///
    /// Not transactional: on [`SessionError::PartialSave`] the mutations not
    /// listed as failed have been applied.
    async fn save(&self, batch: MutationBatch) -> SessionResult<()>;
}

/// Routes records to their backend and applies the record codec.
///
/// Credentials always go to the durable backend; other records go to the
/// key backend, which is the durable backend itself in
/// [`StorageMode::RemoteOnly`]. Cheap to clone.
#[derive(Clone)]
pub struct SessionKeyStore {
    mode: StorageMode,
    durable: Arc<dyn RecordBackend>,
    keys: Arc<dyn RecordBackend>,
}

impl SessionKeyStore {
    /// Every record on `durable`.
    pub fn remote_only(durable: Arc<dyn RecordBackend>) -> Self {
        Self {
            mode: StorageMode::RemoteOnly,
            keys: durable.clone(),
            durable,
        }
    }

    /// Credentials on `durable`, everything else on `local`.
    pub fn local_fast_path(durable: Arc<dyn RecordBackend>, local: Arc<dyn RecordBackend>) -> Self {
        Self {
            mode: StorageMode::LocalFastPath,
            durable,
            keys: local,
        }
    }

    /// Validate `config` and build the backends it describes on top of
    /// `client`. Performs no I/O.
    pub fn from_config(config: &SessionConfig, client: Arc<dyn ObjectClient>) -> SessionResult<Self> {
        config.validate()?;
        let durable = Arc::new(ObjectStoreBackend::new(
            client,
            config.object_store.bucket.clone(),
            config.session_id.clone(),
        ));
        Ok(match config.mode {
            StorageMode::RemoteOnly => Self::remote_only(durable),
            StorageMode::LocalFastPath => Self::local_fast_path(
                durable,
                Arc::new(LocalFileBackend::new(&config.sessions_root, &config.session_id)),
            ),
        })
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Backend responsible for `key`.
    pub fn backend_for(&self, key: &RecordKey) -> &Arc<dyn RecordBackend> {
        if key.is_creds() {
            &self.durable
        } else {
            &self.keys
        }
    }

    /// Where `key` is stored.
    pub fn location(&self, key: &RecordKey) -> Option<String> {
        self.backend_for(key).location(&key.storage_name())
    }

    /// Read and decode one record.
    pub async fn read(&self, key: &RecordKey) -> SessionResult<Option<RecordValue>> {
        let name = key.storage_name();
        let Some(text) = self
            .backend_for(key)
            .get(&name)
            .await
            .map_err(|e| SessionError::from_store(&name, e))?
        else {
            return Ok(None);
        };
        decode(&text)
            .map(Some)
            .map_err(|e| SessionError::from_codec(&name, e))
    }

    /// Encode and write one record.
    pub async fn write(&self, key: &RecordKey, value: &RecordValue) -> SessionResult<()> {
        let name = key.storage_name();
        let text = encode(value).map_err(|e| SessionError::from_codec(&name, e))?;
        self.backend_for(key)
            .put(&name, &text)
            .await
            .map_err(|e| SessionError::from_store(&name, e))
    }

    /// Delete one record. Deleting a missing record succeeds.
    pub async fn remove(&self, key: &RecordKey) -> SessionResult<()> {
        let name = key.storage_name();
        self.backend_for(key)
            .delete(&name)
            .await
            .map_err(|e| SessionError::from_store(&name, e))
    }

    /// Read the credentials record.
    pub async fn read_credentials(&self) -> SessionResult<Option<AuthCredentials>> {
        let Some(value) = self.read(&RecordKey::Creds).await? else {
            return Ok(None);
        };
        from_record_value(&value)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                key: RecordKey::Creds.storage_name(),
                reason: e.to_string(),
            })
    }

    /// Write the credentials record to the durable backend.
    pub async fn write_credentials(&self, creds: &AuthCredentials) -> SessionResult<()> {
        let value = to_record_value(creds)
            .map_err(|e| SessionError::from_codec(&RecordKey::Creds.storage_name(), e))?;
        self.write(&RecordKey::Creds, &value).await
    }

    async fn load_one(&self, key: RecordKey) -> LoadResult {
        warn_if_ambiguous(&key);
        let value = match self.read(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(e) if e.is_corruption() => {
                error!(key = %key, error = %e, "corrupt record");
                return Err(e);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "record fetch failed, treating as absent");
                return Ok(None);
            }
        };
        if key.category() == Some(KeyCategory::AppStateSyncKey) {
            return AppStateSyncKeyData::from_record(&value)
                .map(|data| Some(KeyData::AppStateSyncKey(data)))
                .map_err(|reason| SessionError::Corrupt {
                    key: key.storage_name(),
                    reason,
                });
        }
        Ok(Some(KeyData::Value(value)))
    }

    async fn apply(&self, key: &RecordKey, mutation: Mutation) -> SessionResult<()> {
        warn_if_ambiguous(key);
        match mutation {
            Mutation::Set(value) => self.write(key, &value).await,
            Mutation::Delete => self.remove(key).await,
        }
    }
}

fn warn_if_ambiguous(key: &RecordKey) {
    if let Err(e) = key.check_unambiguous() {
        warn!(key = %key, error = %e, "record key may share a location with another key");
    }
}

#[async_trait]
impl SignalKeyStore for SessionKeyStore {
    async fn load(&self, category: KeyCategory, ids: &[String]) -> BTreeMap<String, LoadResult> {
        let unique: BTreeSet<&String> = ids.iter().collect();
        let fetches = unique.into_iter().map(|id| async move {
            let result = self.load_one(RecordKey::signal(category, id.clone())).await;
            (id.clone(), result)
        });
        let results: BTreeMap<String, LoadResult> = join_all(fetches).await.into_iter().collect();
        debug!(
            %category,
            requested = results.len(),
            found = results.values().filter(|r| matches!(r, Ok(Some(_)))).count(),
            "batch load"
        );
        results
    }

    async fn save(&self, batch: MutationBatch) -> SessionResult<()> {
        let total = batch.len();
        let writes = batch.into_iter().map(|(key, mutation)| async move {
            let result = self.apply(&key, mutation).await;
            (key, result)
        });

        let mut failures = Vec::new();
        for (key, result) in join_all(writes).await {
            if let Err(e) = result {
                error!(key = %key, error = %e, "mutation failed");
                failures.push(KeyFailure {
                    key: key.storage_name(),
                    error: e,
                });
            }
        }

        debug!(total, failed = failures.len(), "batch save");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SessionError::PartialSave { failures })
        }
    }
}

impl std::fmt::Debug for SessionKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeyStore")
            .field("mode", &self.mode)
            .finish()
    }
}
