//! Per-session auth-state persistence for a messaging client.
//!
//! A [`SessionAuthState`] binds a session id to its storage backends and
//! holds the session's credentials in memory. The protocol client reads
//! and writes signal key material in batches through [`SignalKeyStore`] and
//! calls [`SessionAuthState::persist_credentials`] whenever the credentials
//! change.
//!
//! # Storage Modes
//!
//! - [`StorageMode::RemoteOnly`] -- every record lives in the object store
//! - [`StorageMode::LocalFastPath`] -- credentials live in the object store,
//!   all other records in `<sessions_root>/<sessionId>/` on local disk
//!
//! # Failure Semantics
//!
//! - A missing record loads as `Ok(None)`.
//! - A corrupt record fails only its own id.
//! - A backend failure during load is logged and the id loads as absent.
//! - A batch save reports every failed key in
//!   [`SessionError::PartialSave`]; the other mutations are applied.
//! - Credentials are generated only when the store reports them absent;
//!   any other read failure aborts [`SessionAuthState::open`].
//!
//! Process-wide collaborators of the protocol client (retry counters,
//! caches) are not created here.

pub mod app_state;
pub mod config;
pub mod error;
pub mod keys;
pub mod mutation;
pub mod state;

pub use app_state::{AppStateSyncKeyData, AppStateSyncKeyFingerprint};
pub use config::{ObjectStoreConfig, SessionConfig, StorageMode};
pub use error::{KeyFailure, SessionError, SessionResult};
pub use keys::{KeyData, LoadResult, SessionKeyStore, SignalKeyStore};
pub use mutation::{Mutation, MutationBatch};
pub use state::SessionAuthState;
