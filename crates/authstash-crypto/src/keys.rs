use authstash_codec::BufferBytes;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::xeddsa;

/// Key-type prefix the protocol prepends to Curve25519 public keys before
/// signing them.
const KEY_TYPE_DJB: u8 = 0x05;

/// Curve25519 key pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub private: BufferBytes,
    pub public: BufferBytes,
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand::thread_rng());
        let public = PublicKey::from(&secret);
        Self {
            private: BufferBytes::from(secret.to_bytes()),
            public: BufferBytes::from(*public.as_bytes()),
        }
    }

    /// Rebuild a key pair from its 32-byte private key.
    pub fn from_private(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self {
            private: BufferBytes::from(bytes),
            public: BufferBytes::from(*public.as_bytes()),
        }
    }

    /// XEdDSA-sign `message` with this pair's private key.
    pub fn sign(&self, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let private = key_bytes(&self.private)?;
        let mut random = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut random);
        Ok(xeddsa::sign(&private, message, &random).to_vec())
    }

    /// Verify an XEdDSA signature against this pair's public key. The
    /// private half is not consulted.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
        verify_signature(&self.public, message, signature)
    }

    /// Public key with the protocol's key-type prefix.
    pub fn prefixed_public(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.public.len() + 1);
        out.push(KEY_TYPE_DJB);
        out.extend_from_slice(&self.public);
        out
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair(public={}, private=<redacted>)", hex::encode(&*self.public))
    }
}

/// Verify an XEdDSA signature given only a 32-byte Curve25519 public key.
pub fn verify_signature(public: &[u8], message: &[u8], signature: &[u8]) -> CryptoResult<()> {
    let public = key_bytes(public)?;
    let signature: [u8; xeddsa::SIGNATURE_LENGTH] =
        signature
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: xeddsa::SIGNATURE_LENGTH,
                actual: signature.len(),
            })?;
    xeddsa::verify(&public, message, &signature)
}

fn key_bytes(bytes: &[u8]) -> CryptoResult<[u8; 32]> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: bytes.len(),
    })
}

/// Pre-key signed by the identity key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedKeyPair {
    pub key_pair: KeyPair,
    pub signature: BufferBytes,
    pub key_id: u32,
}

impl SignedKeyPair {
    /// Generate a fresh pre-key and sign its public key with `identity`.
    pub fn generate(identity: &KeyPair, key_id: u32) -> CryptoResult<Self> {
        let key_pair = KeyPair::generate();
        let signature = identity.sign(&key_pair.prefixed_public())?;
        Ok(Self {
            key_pair,
            signature: BufferBytes::new(signature),
            key_id,
        })
    }

    /// Check the signature against the identity public key.
    pub fn verify(&self, identity_public: &[u8]) -> CryptoResult<()> {
        verify_signature(identity_public, &self.key_pair.prefixed_public(), &self.signature)
    }
}
