//! Structured app-state sync keys.
//!
//! Records in the `app-state-sync-key` category are rehydrated into
//! [`AppStateSyncKeyData`] on load, accepting the loose forms the protocol
//! client's message decoder accepts: bytes as a buffer or base64 string and
//! 64-bit timestamps as a number, a decimal string, or a `{low, high}` pair.
//! Unknown fields are dropped.

use std::collections::BTreeMap;

use authstash_codec::RecordValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Fingerprint of an app-state sync key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppStateSyncKeyFingerprint {
    pub raw_id: Option<u32>,
    pub current_index: Option<u32>,
    pub device_indexes: Vec<u32>,
}

/// Key material used to decrypt app-state patches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppStateSyncKeyData {
    pub key_data: Option<Vec<u8>>,
    pub fingerprint: Option<AppStateSyncKeyFingerprint>,
    pub timestamp: Option<i64>,
}

impl AppStateSyncKeyData {
    /// Rehydrate from a decoded record. Returns a description of the first
    /// mismatch on failure.
    pub fn from_record(value: &RecordValue) -> Result<Self, String> {
        let fields = value
            .as_object()
            .ok_or_else(|| "expected an object".to_string())?;

        let key_data = match present(fields, "keyData") {
            None => None,
            Some(RecordValue::Bytes(b)) => Some(b.clone()),
            Some(RecordValue::String(s)) => Some(
                STANDARD
                    .decode(s.as_bytes())
                    .map_err(|e| format!("keyData: invalid base64: {e}"))?,
            ),
            Some(other) => return Err(format!("keyData: unexpected {}", kind(other))),
        };

        let fingerprint = match present(fields, "fingerprint") {
            None => None,
            Some(RecordValue::Object(fp)) => Some(AppStateSyncKeyFingerprint {
                raw_id: opt_u32(fp, "rawId")?,
                current_index: opt_u32(fp, "currentIndex")?,
                device_indexes: match present(fp, "deviceIndexes") {
                    None => Vec::new(),
                    Some(RecordValue::Array(items)) => items
                        .iter()
                        .map(|v| to_u32(v, "deviceIndexes"))
                        .collect::<Result<_, _>>()?,
                    Some(other) => {
                        return Err(format!("deviceIndexes: unexpected {}", kind(other)))
                    }
                },
            }),
            Some(other) => return Err(format!("fingerprint: unexpected {}", kind(other))),
        };

        let timestamp = match present(fields, "timestamp") {
            None => None,
            Some(v) => Some(to_i64(v)?),
        };

        Ok(Self {
            key_data,
            fingerprint,
            timestamp,
        })
    }

    /// Plain record form, as written back to storage.
    pub fn to_record(&self) -> RecordValue {
        let mut fields = BTreeMap::new();
        if let Some(key) = &self.key_data {
            fields.insert("keyData".to_string(), RecordValue::Bytes(key.clone()));
        }
        if let Some(fp) = &self.fingerprint {
            let mut out = BTreeMap::new();
            if let Some(raw_id) = fp.raw_id {
                out.insert("rawId".to_string(), RecordValue::from(raw_id));
            }
            if let Some(index) = fp.current_index {
                out.insert("currentIndex".to_string(), RecordValue::from(index));
            }
            out.insert(
                "deviceIndexes".to_string(),
                RecordValue::Array(fp.device_indexes.iter().map(|i| RecordValue::from(*i)).collect()),
            );
            fields.insert("fingerprint".to_string(), RecordValue::Object(out));
        }
        if let Some(ts) = self.timestamp {
            fields.insert("timestamp".to_string(), RecordValue::from(ts));
        }
        RecordValue::Object(fields)
    }
}

fn present<'a>(fields: &'a BTreeMap<String, RecordValue>, name: &str) -> Option<&'a RecordValue> {
    fields.get(name).filter(|v| !v.is_null())
}

fn kind(value: &RecordValue) -> &'static str {
    match value {
        RecordValue::Null => "null",
        RecordValue::Bool(_) => "boolean",
        RecordValue::Number(_) => "number",
        RecordValue::String(_) => "string",
        RecordValue::Bytes(_) => "buffer",
        RecordValue::Array(_) => "array",
        RecordValue::Object(_) => "object",
    }
}

fn to_u32(value: &RecordValue, field: &str) -> Result<u32, String> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("{field}: expected u32, got {}", kind(value)))
}

fn opt_u32(fields: &BTreeMap<String, RecordValue>, name: &str) -> Result<Option<u32>, String> {
    present(fields, name).map(|v| to_u32(v, name)).transpose()
}

fn to_i64(value: &RecordValue) -> Result<i64, String> {
    match value {
        RecordValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("timestamp: {n} is not an integer")),
        RecordValue::String(s) => s
            .parse::<i64>()
            .map_err(|e| format!("timestamp: {e}")),
        RecordValue::Object(parts) => {
            let low = parts.get("low").and_then(RecordValue::as_i64);
            let high = parts.get("high").and_then(RecordValue::as_i64);
            match (low, high) {
                (Some(low), Some(high)) => Ok((high << 32) | (low & 0xffff_ffff)),
                _ => Err("timestamp: expected {low, high}".to_string()),
            }
        }
        other => Err(format!("timestamp: unexpected {}", kind(other))),
    }
}
