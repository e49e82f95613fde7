//! Foundation types for authstash.
//!
//! Every record persisted for a messaging session is addressed by a
//! [`RecordKey`]: either the singleton credentials record or a
//! `(category, id)` pair of signal key material. This crate owns the
//! mapping from those keys to backend-safe names and storage locations.
//!
//! # Key Types
//!
//! - [`KeyCategory`] -- Closed set of signal-data categories
//! - [`RecordKey`] -- Logical name of one stored record
//! - [`SessionId`] -- Validated session identifier
//! - [`ObjectLocation`] -- Fully-qualified object-store key
//!
//! # Location Formats
//!
//! ```text
//! object store:  <bucket>/sessions/<sessionId>-<normalized key>.json
//! local disk:    <root>/<sessionId>/<normalized key>.json
//! ```
//!
//! # Session Ids
//!
//! A [`SessionId`] may contain only ASCII letters, digits, `_` and `.`, and
//! must not start with `.`. The `-` after the session id in an object key
//! is the only separator, so a dash inside the id could make two sessions
//! share a key. UUIDs and other dashed ids are accepted through
//! [`SessionId::normalized`], which maps `-` to `_`.

pub mod category;
pub mod error;
pub mod key;
pub mod names;
pub mod session;

pub use category::KeyCategory;
pub use error::{TypeError, TypeResult};
pub use key::RecordKey;
pub use names::{local_file_name, normalize_key_name, ObjectLocation};
pub use session::SessionId;
