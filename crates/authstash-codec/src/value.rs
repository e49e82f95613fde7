use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{CodecError, CodecResult};

/// Tag value marking a binary leaf.
pub(crate) const BUFFER_TAG: &str = "Buffer";

/// In-memory shape of a stored record.
///
/// Mirrors the JSON data model with one extra leaf type, [`RecordValue::Bytes`],
/// for binary key material.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RecordValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<RecordValue>),
    Object(BTreeMap<String, RecordValue>),
}

impl RecordValue {
    /// Convert to plain JSON, tagging every binary leaf.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Bytes(bytes) => buffer_json(bytes),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Convert from plain JSON, reconstituting tagged binary leaves.
    pub fn from_json(value: Value) -> CodecResult<Self> {
        revive(value, &mut String::from("$"))
    }

    /// Field of an object, if this is one.
    pub fn get(&self, field: &str) -> Option<&RecordValue> {
        match self {
            Self::Object(fields) => fields.get(field),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RecordValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, RecordValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Build an object from `(field, value)` pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RecordValue)>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

pub(crate) fn buffer_json(bytes: &[u8]) -> Value {
    let mut tagged = Map::new();
    tagged.insert("type".into(), Value::String(BUFFER_TAG.into()));
    tagged.insert(
        "data".into(),
        Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    );
    Value::Object(tagged)
}

/// `{"type":"Buffer", ...}`, or the legacy `{"buffer":true, ...}` marker.
fn is_buffer_tag(fields: &Map<String, Value>) -> bool {
    matches!(fields.get("type"), Some(Value::String(t)) if t == BUFFER_TAG)
        || fields.get("buffer") == Some(&Value::Bool(true))
}

fn revive(value: Value, path: &mut String) -> CodecResult<RecordValue> {
    Ok(match value {
        Value::Null => RecordValue::Null,
        Value::Bool(b) => RecordValue::Bool(b),
        Value::Number(n) => RecordValue::Number(n),
        Value::String(s) => RecordValue::String(s),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                out.push(revive(item, path)?);
                path.truncate(len);
            }
            RecordValue::Array(out)
        }
        Value::Object(fields) if is_buffer_tag(&fields) => {
            RecordValue::Bytes(buffer_payload(fields, path)?)
        }
        Value::Object(fields) => {
            let mut out = BTreeMap::new();
            for (k, v) in fields {
                let len = path.len();
                path.push('.');
                path.push_str(&k);
                let revived = revive(v, path)?;
                path.truncate(len);
                out.insert(k, revived);
            }
            RecordValue::Object(out)
        }
    })
}

/// Extract the bytes of a `Buffer`-tagged object.
///
/// The payload sits in `data` (legacy records: `value`) and is either an
/// array of integers in `0..=255` or a base64 string.
fn buffer_payload(mut fields: Map<String, Value>, path: &str) -> CodecResult<Vec<u8>> {
    let corrupt = |reason: String| CodecError::CorruptBuffer {
        path: path.to_string(),
        reason,
    };
    let payload = match fields.remove("data") {
        Some(data) => Some(data),
        None => fields.remove("value"),
    };
    match payload {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| corrupt(format!("data[{i}] is not a byte: {item}")))
            })
            .collect(),
        Some(Value::String(encoded)) => STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| corrupt(format!("invalid base64 data: {e}"))),
        Some(other) => Err(corrupt(format!("unexpected data: {other}"))),
        None => Err(corrupt("missing data".into())),
    }
}

impl Serialize for RecordValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

impl From<bool> for RecordValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u64> for RecordValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for RecordValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u32> for RecordValue {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for RecordValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for RecordValue {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<RecordValue>> for RecordValue {
    fn from(items: Vec<RecordValue>) -> Self {
        Self::Array(items)
    }
}
