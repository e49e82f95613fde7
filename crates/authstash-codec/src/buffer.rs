use std::fmt;
use std::ops::Deref;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::{buffer_json, BUFFER_TAG};

/// Byte string that serializes with the `Buffer` tag.
///
/// Typed records use this for binary fields so that they share the wire
/// format of [`RecordValue::Bytes`](crate::RecordValue::Bytes).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BufferBytes(pub Vec<u8>);

impl BufferBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for BufferBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for BufferBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for BufferBytes {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for BufferBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferBytes({} bytes)", self.0.len())
    }
}

impl Serialize for BufferBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        buffer_json(&self.0).serialize(serializer)
    }
}

#[derive(Deserialize)]
struct TaggedBuffer {
    #[serde(rename = "type")]
    kind: String,
    data: BufferData,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BufferData {
    Bytes(Vec<u8>),
    Base64(String),
}

impl<'de> Deserialize<'de> for BufferBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = TaggedBuffer::deserialize(deserializer)?;
        if tagged.kind != BUFFER_TAG {
            return Err(serde::de::Error::custom(format!(
                "expected type {BUFFER_TAG:?}, found {:?}",
                tagged.kind
            )));
        }
        match tagged.data {
            BufferData::Bytes(bytes) => Ok(Self(bytes)),
            BufferData::Base64(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Self)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_tag() {
        let b = BufferBytes::new(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&b).unwrap(),
            json!({"type": "Buffer", "data": [1, 2]})
        );
    }

    #[test]
    fn deserializes_both_payload_forms() {
        let a: BufferBytes =
            serde_json::from_value(json!({"type": "Buffer", "data": [1, 2, 3]})).unwrap();
        let b: BufferBytes =
            serde_json::from_value(json!({"type": "Buffer", "data": "AQID"})).unwrap();
        assert_eq!(a, b);
        assert_eq!(&*a, &[1, 2, 3]);
    }

    #[test]
    fn rejects_wrong_tag() {
        let r: Result<BufferBytes, _> =
            serde_json::from_value(json!({"type": "Blob", "data": [1]}));
        assert!(r.is_err());
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        let r: Result<BufferBytes, _> =
            serde_json::from_value(json!({"type": "Buffer", "data": [300]}));
        assert!(r.is_err());
    }

    #[test]
    fn debug_hides_content() {
        let b = BufferBytes::new(vec![0xaa; 32]);
        assert_eq!(format!("{b:?}"), "BufferBytes(32 bytes)");
    }
}
