/// Errors from record backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record name was empty.
    #[error("record name must not be empty")]
    EmptyKey,

    /// The remote store rejected or failed the request (network,
    /// permission, throttling, timeout).
    #[error("backend error at {location}: {message}")]
    Backend { location: String, message: String },

    /// I/O error from the local filesystem.
    #[error("I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored object is not UTF-8 text.
    #[error("stored record at {location} is not valid UTF-8")]
    InvalidUtf8 { location: String },

    /// The object key cannot be mapped onto the backend.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(location: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            location: location.to_string(),
            source,
        }
    }

    /// Returns `true` if the stored data itself is unusable, as opposed to
    /// the backend being unreachable.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::InvalidUtf8 { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
