//! Record backends for authstash.
//!
//! A record backend stores the serialized text of one named record. Two
//! backends are provided:
//!
//! - [`ObjectStoreBackend`] -- durable, shareable storage on a remote object
//!   store reached through an [`ObjectClient`]
//! - [`LocalFileBackend`] -- one file per record under a session directory
//!
//! Object clients:
//!
//! - [`InMemoryObjectClient`] -- `HashMap`-based client for tests and
//!   embedding, with per-key fault injection
//! - [`DirObjectClient`] -- maps buckets and keys onto a local directory tree
//!
//! # Design Rules
//!
//! 1. A missing record is `Ok(None)`, never an error.
//! 2. Deleting a missing record succeeds.
//! 3. Writes are unconditional upserts; last writer wins.
//! 4. Operations on one record never depend on another record's state.
//! 5. No internal retries: transient failures surface to the caller.

pub mod dir;
pub mod error;
pub mod local;
pub mod memory;
pub mod object;
pub mod traits;

mod atomic;

pub use dir::DirObjectClient;
pub use error::{StoreError, StoreResult};
pub use local::LocalFileBackend;
pub use memory::InMemoryObjectClient;
pub use object::ObjectStoreBackend;
pub use traits::{ObjectClient, RecordBackend};
