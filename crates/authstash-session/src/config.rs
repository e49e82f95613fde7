use std::path::{Path, PathBuf};

use authstash_types::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Where non-credential records are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// Every record goes to the object store.
    #[default]
    RemoteOnly,
    /// Credentials go to the object store; all other records go to local
    /// disk.
    LocalFastPath,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteOnly => "remote-only",
            Self::LocalFastPath => "local-fast-path",
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for the object store. No defaults: every field is
/// supplied by the caller.
///
/// Only `bucket` is read here. The access key, secret and region are checked
/// for presence and are otherwise for the caller, who hands them to whatever
/// [`ObjectClient`](authstash_store::ObjectClient) it builds.
/// [`DirObjectClient`](authstash_store::DirObjectClient) has no use for them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Configuration of one session handle.
///
/// ```toml
/// session_id = "testId"
/// mode = "local-fast-path"
///
/// [object_store]
/// access_key_id = "AKIA..."
/// secret_access_key = "..."
/// region = "us-east-1"
/// bucket = "my-bucket"
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub session_id: SessionId,
    #[serde(default)]
    pub mode: StorageMode,
    /// Parent of the per-session directories used in local fast-path mode.
    #[serde(default = "default_sessions_root")]
    pub sessions_root: PathBuf,
    pub object_store: ObjectStoreConfig,
}

fn default_sessions_root() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("sessions")
}

impl SessionConfig {
    pub fn new(session_id: SessionId, object_store: ObjectStoreConfig) -> Self {
        Self {
            session_id,
            mode: StorageMode::default(),
            sessions_root: default_sessions_root(),
            object_store,
        }
    }

    pub fn with_mode(mut self, mode: StorageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sessions_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sessions_root = root.into();
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SessionResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check that the object-store settings are complete.
    pub fn validate(&self) -> SessionResult<()> {
        let store = &self.object_store;
        for (field, value) in [
            ("access_key_id", &store.access_key_id),
            ("secret_access_key", &store.secret_access_key),
            ("region", &store.region),
            ("bucket", &store.bucket),
        ] {
            if value.trim().is_empty() {
                return Err(SessionError::Config(format!(
                    "object_store.{field} must not be empty"
                )));
            }
        }
        if store.bucket.contains('/') {
            return Err(SessionError::Config(
                "object_store.bucket must not contain '/'".into(),
            ));
        }
        Ok(())
    }
}
