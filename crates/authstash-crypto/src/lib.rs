//! Credential material for authstash sessions.
//!
//! Generates the credential bundle a fresh messaging session starts with:
//! Curve25519 key pairs for the noise handshake and identity, a signed
//! pre-key, a registration id, and the account secret. Serialized field
//! names follow the protocol client's camelCase JSON layout, with binary
//! keys written as `Buffer`-tagged values.
//!
//! Pre-keys are signed with XEdDSA, so a signature checks out against the
//! 32-byte Curve25519 identity public key alone. All curve arithmetic comes
//! from the dalek crates.

pub mod creds;
pub mod error;
pub mod keys;
pub mod xeddsa;

pub use creds::{AccountSettings, AuthCredentials};
pub use error::{CryptoError, CryptoResult};
pub use keys::{verify_signature, KeyPair, SignedKeyPair};
