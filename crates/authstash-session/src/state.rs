use std::sync::Arc;

use authstash_crypto::AuthCredentials;
use authstash_store::ObjectClient;
use authstash_types::SessionId;
use tracing::info;

use crate::config::{SessionConfig, StorageMode};
use crate::error::{SessionError, SessionResult};
use crate::keys::SessionKeyStore;

/// Auth state of one session: the in-memory credentials plus the key
/// store.
///
/// Only obtainable through [`open`](Self::open) or
/// [`bootstrap`](Self::bootstrap), which load or create the credentials
/// before returning, so a handle is always ready for use.
pub struct SessionAuthState {
    session: SessionId,
    creds: AuthCredentials,
    keys: SessionKeyStore,
}

impl SessionAuthState {
    /// Build the backends described by `config` on top of `client` and
    /// bootstrap the credentials.
    pub async fn open(config: &SessionConfig, client: Arc<dyn ObjectClient>) -> SessionResult<Self> {
        let keys = SessionKeyStore::from_config(config, client)?;
        Self::bootstrap(config.session_id.clone(), keys).await
    }

    /// Load the credentials through `keys`, creating and persisting a fresh
    /// bundle if none exists.
    ///
    /// A backend failure while reading aborts: the credentials are only
    /// generated when the store positively reports them absent.
    pub async fn bootstrap(session: SessionId, keys: SessionKeyStore) -> SessionResult<Self> {
        let creds = match keys.read_credentials().await? {
            Some(creds) => {
                info!(session = %session, "loaded existing credentials");
                creds
            }
            None => {
                let creds = AuthCredentials::generate()
                    .map_err(|e| SessionError::Credentials(e.to_string()))?;
                keys.write_credentials(&creds).await?;
                info!(
                    session = %session,
                    registration_id = creds.registration_id,
                    "created new credentials"
                );
                creds
            }
        };
        Ok(Self {
            session,
            creds,
            keys,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    pub fn mode(&self) -> StorageMode {
        self.keys.mode()
    }

    pub fn credentials(&self) -> &AuthCredentials {
        &self.creds
    }

    /// Mutable access for the protocol client; call
    /// [`persist_credentials`](Self::persist_credentials) afterwards.
    pub fn credentials_mut(&mut self) -> &mut AuthCredentials {
        &mut self.creds
    }

    /// The batch key store, to hand to the protocol client.
    pub fn keys(&self) -> &SessionKeyStore {
        &self.keys
    }

    /// Write the in-memory credentials to the durable backend.
    pub async fn persist_credentials(&self) -> SessionResult<()> {
        self.keys.write_credentials(&self.creds).await
    }

    pub fn into_parts(self) -> (AuthCredentials, SessionKeyStore) {
        (self.creds, self.keys)
    }
}

impl std::fmt::Debug for SessionAuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthState")
            .field("session", &self.session)
            .field("mode", &self.keys.mode())
            .finish()
    }
}
