use thiserror::Error;

/// Errors from record encoding and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not valid JSON.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// A `Buffer`-tagged value does not carry a valid byte payload.
    #[error("corrupt buffer at {path}: {reason}")]
    CorruptBuffer { path: String, reason: String },

    /// A typed record does not match the stored shape.
    #[error("record shape mismatch: {0}")]
    Shape(String),

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Returns `true` if the stored bytes are unusable.
    pub fn is_corruption(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
