//! XEdDSA signatures over Curve25519 key pairs.
//!
//! The signing key is the clamped X25519 private scalar, mapped onto the
//! twisted Edwards curve. The sign bit of the resulting Edwards public key is
//! carried in the top bit of the signature's last byte, so a verifier only
//! needs the 32-byte Montgomery public key.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha512};

use crate::error::{CryptoError, CryptoResult};

pub const SIGNATURE_LENGTH: usize = 64;

/// Domain separator for the nonce hash: `2^256 - 2` little-endian.
const NONCE_PREFIX: [u8; 32] = {
    let mut prefix = [0xFF; 32];
    prefix[0] = 0xFE;
    prefix
};

/// Sign `message` with a Curve25519 private key. `random` is fresh
/// randomness mixed into the nonce.
pub fn sign(private: &[u8; 32], message: &[u8], random: &[u8; 64]) -> [u8; SIGNATURE_LENGTH] {
    let a = Scalar::from_bytes_mod_order(clamp_integer(*private));
    let ed_public = EdwardsPoint::mul_base(&a).compress();
    let sign_bit = ed_public.as_bytes()[31] & 0x80;

    let r = Scalar::from_hash(
        Sha512::new()
            .chain_update(NONCE_PREFIX)
            .chain_update(a.as_bytes())
            .chain_update(message)
            .chain_update(random),
    );
    let cap_r = EdwardsPoint::mul_base(&r).compress();
    let h = Scalar::from_hash(
        Sha512::new()
            .chain_update(cap_r.as_bytes())
            .chain_update(ed_public.as_bytes())
            .chain_update(message),
    );
    let s = h * a + r;

    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature[..32].copy_from_slice(cap_r.as_bytes());
    signature[32..].copy_from_slice(s.as_bytes());
    signature[63] &= 0x7F;
    signature[63] |= sign_bit;
    signature
}

/// Verify a signature against a Curve25519 public key.
pub fn verify(public: &[u8; 32], message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> CryptoResult<()> {
    let sign_bit = (signature[63] & 0x80) >> 7;
    let ed_public = MontgomeryPoint(*public)
        .to_edwards(sign_bit)
        .ok_or(CryptoError::InvalidSignature)?;
    let verifying = VerifyingKey::from_bytes(ed_public.compress().as_bytes())
        .map_err(|_| CryptoError::InvalidSignature)?;

    let mut ed_signature = *signature;
    ed_signature[63] &= 0x7F;
    verifying
        .verify(message, &Signature::from_bytes(&ed_signature))
        .map_err(|_| CryptoError::InvalidSignature)
}
