use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::value::RecordValue;

/// Encode a record as UTF-8 JSON text.
pub fn encode(value: &RecordValue) -> CodecResult<String> {
    serde_json::to_string(&value.to_json()).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decode JSON text written by [`encode`].
///
/// Invalid JSON and malformed `Buffer` tags are both reported as
/// corruption.
pub fn decode(text: &str) -> CodecResult<RecordValue> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;
    RecordValue::from_json(json)
}

/// Convert a typed record into a [`RecordValue`].
pub fn to_record_value<T: Serialize>(record: &T) -> CodecResult<RecordValue> {
    let json = serde_json::to_value(record).map_err(|e| CodecError::Serialization(e.to_string()))?;
    RecordValue::from_json(json)
}

/// Convert a [`RecordValue`] into a typed record.
pub fn from_record_value<T: DeserializeOwned>(value: &RecordValue) -> CodecResult<T> {
    serde_json::from_value(value.to_json()).map_err(|e| CodecError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferBytes;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct KeyPair {
        private_key: BufferBytes,
        public_key: BufferBytes,
        key_id: u32,
    }

    #[test]
    fn encode_writes_tagged_text() {
        let v = RecordValue::object([("k", RecordValue::from(vec![1u8, 2]))]);
        let text = encode(&v).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, serde_json::json!({"k": {"type": "Buffer", "data": [1, 2]}}));
    }

    #[test]
    fn decode_restores_bytes() {
        let v = decode(r#"{"k":{"type":"Buffer","data":[1,2]},"n":3}"#).unwrap();
        assert_eq!(v.get("k").and_then(RecordValue::as_bytes), Some(&[1u8, 2][..]));
        assert_eq!(v.get("n").and_then(RecordValue::as_u64), Some(3));
    }

    #[test]
    fn decode_invalid_json_is_malformed() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
        assert!(err.is_corruption());
    }

    #[test]
    fn decode_bad_tag_is_corruption() {
        let err = decode(r#"{"k":{"type":"Buffer","data":"%%%"}}"#).unwrap_err();
        assert!(matches!(err, CodecError::CorruptBuffer { .. }));
        assert!(err.is_corruption());
    }

    #[test]
    fn typed_record_shares_wire_format() {
        let pair = KeyPair {
            private_key: BufferBytes::new(vec![1; 4]),
            public_key: BufferBytes::new(vec![2; 4]),
            key_id: 7,
        };
        let value = to_record_value(&pair).unwrap();
        assert_eq!(
            value.get("publicKey").and_then(RecordValue::as_bytes),
            Some(&[2u8; 4][..])
        );
        let text = encode(&value).unwrap();
        let back: KeyPair = from_record_value(&decode(&text).unwrap()).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn typed_shape_mismatch() {
        let value = RecordValue::object([("keyId", RecordValue::from("nope"))]);
        let err = from_record_value::<KeyPair>(&value).unwrap_err();
        assert!(matches!(err, CodecError::Shape(_)));
    }

    fn record_strategy() -> impl Strategy<Value = RecordValue> {
        let leaf = prop_oneof![
            Just(RecordValue::Null),
            any::<bool>().prop_map(RecordValue::Bool),
            any::<i64>().prop_map(RecordValue::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(RecordValue::String),
            proptest::collection::vec(any::<u8>(), 0..48).prop_map(RecordValue::Bytes),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(RecordValue::Array),
                proptest::collection::btree_map("[a-x]{1,8}", inner, 0..6)
                    .prop_map(RecordValue::Object),
            ]
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(record in record_strategy()) {
            let text = encode(&record).unwrap();
            prop_assert_eq!(decode(&text).unwrap(), record);
        }
    }
}
