//! Buffer-aware JSON codec for authstash records.
//!
//! Records are JSON documents whose leaves may be raw binary key material.
//! Plain JSON has no binary type, so binary leaves are written with a tag:
//!
//! ```text
//! {"type": "Buffer", "data": [1, 2, 255]}
//! ```
//!
//! Decoding reverses the tagging. A tagged object whose payload is not a
//! valid byte sequence is corruption and fails the whole record; it is never
//! handed back as an ordinary object.
//!
//! Records that happen to contain an object with a string field
//! `"type": "Buffer"` are read as binary. This matches what every writer of
//! the format does and is an accepted restriction on record shapes.

pub mod buffer;
pub mod error;
pub mod json;
pub mod value;

pub use buffer::BufferBytes;
pub use error::{CodecError, CodecResult};
pub use json::{decode, encode, from_record_value, to_record_value};
pub use value::RecordValue;
