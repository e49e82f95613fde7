use authstash_codec::BufferBytes;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CryptoResult;
use crate::keys::{KeyPair, SignedKeyPair};

/// Registration ids are 14-bit.
const REGISTRATION_ID_MASK: u16 = 0x3fff;

/// Account-level settings carried in the credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    pub unarchive_chats: bool,
    /// Settings the protocol client adds later, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The per-session credentials bundle.
///
/// Fields the protocol client adds after pairing (account, device identity,
/// platform, ...) are kept in `extra` and written back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCredentials {
    pub noise_key: KeyPair,
    pub pairing_ephemeral_key_pair: KeyPair,
    pub signed_identity_key: KeyPair,
    pub signed_pre_key: SignedKeyPair,
    pub registration_id: u16,
    pub adv_secret_key: String,
    #[serde(default)]
    pub processed_history_messages: Vec<Value>,
    pub next_pre_key_id: u32,
    pub first_unuploaded_pre_key_id: u32,
    #[serde(default)]
    pub account_sync_counter: u32,
    #[serde(default)]
    pub account_settings: AccountSettings,
    #[serde(default)]
    pub registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_prop_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_info: Option<BufferBytes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthCredentials {
    /// Generate a fresh, unregistered credentials bundle.
    pub fn generate() -> CryptoResult<Self> {
        let mut rng = rand::thread_rng();
        let identity = KeyPair::generate();
        let signed_pre_key = SignedKeyPair::generate(&identity, 1)?;

        let mut adv_secret = [0u8; 32];
        rng.fill_bytes(&mut adv_secret);

        Ok(Self {
            noise_key: KeyPair::generate(),
            pairing_ephemeral_key_pair: KeyPair::generate(),
            signed_identity_key: identity,
            signed_pre_key,
            registration_id: rng.gen::<u16>() & REGISTRATION_ID_MASK,
            adv_secret_key: STANDARD.encode(adv_secret),
            processed_history_messages: Vec::new(),
            next_pre_key_id: 1,
            first_unuploaded_pre_key_id: 1,
            account_sync_counter: 0,
            account_settings: AccountSettings::default(),
            registered: false,
            pairing_code: None,
            last_prop_hash: None,
            routing_info: None,
            extra: Map::new(),
        })
    }

    /// Check the signed pre-key against the identity key.
    pub fn verify_signed_pre_key(&self) -> CryptoResult<()> {
        self.signed_pre_key.verify(&self.signed_identity_key.public)
    }
}
