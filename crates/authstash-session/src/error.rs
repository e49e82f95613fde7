use thiserror::Error;

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The configuration is incomplete or unreadable.
    #[error("config error: {0}")]
    Config(String),

    /// A session id or key failed validation.
    #[error("invalid identifier: {0}")]
    Invalid(#[from] authstash_types::TypeError),

    /// The backend failed for one record (network, permission, I/O).
    #[error("backend failure for {key}: {source}")]
    Backend {
        key: String,
        #[source]
        source: authstash_store::StoreError,
    },

    /// A stored record could not be read back: bad JSON, a malformed
    /// `Buffer` tag, non-UTF-8 bytes, or the wrong shape.
    #[error("record {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// Credential generation failed.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// A record could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Some mutations of a batch failed. Mutations not listed were applied.
    #[error("{} mutation(s) failed: {}", .failures.len(), failed_keys(.failures))]
    PartialSave { failures: Vec<KeyFailure> },
}

impl SessionError {
    /// Returns `true` if stored data is unusable, as opposed to the backend
    /// being unreachable.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    pub(crate) fn from_store(key: &str, source: authstash_store::StoreError) -> Self {
        if source.is_corruption() {
            Self::Corrupt {
                key: key.to_string(),
                reason: source.to_string(),
            }
        } else {
            Self::Backend {
                key: key.to_string(),
                source,
            }
        }
    }

    pub(crate) fn from_codec(key: &str, source: authstash_codec::CodecError) -> Self {
        if source.is_corruption() {
            Self::Corrupt {
                key: key.to_string(),
                reason: source.to_string(),
            }
        } else {
            Self::Encoding(format!("{key}: {source}"))
        }
    }
}

/// One failed mutation within a batch save.
#[derive(Debug)]
pub struct KeyFailure {
    /// Flattened record name, e.g. `pre-key-5`.
    pub key: String,
    pub error: SessionError,
}

fn failed_keys(failures: &[KeyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use authstash_store::StoreError;

    #[test]
    fn store_corruption_maps_to_corrupt() {
        let err = SessionError::from_store(
            "creds",
            StoreError::InvalidUtf8 {
                location: "x".into(),
            },
        );
        assert!(err.is_corruption());
    }

    #[test]
    fn store_outage_maps_to_backend() {
        let err = SessionError::from_store(
            "creds",
            StoreError::Backend {
                location: "x".into(),
                message: "timeout".into(),
            },
        );
        assert!(!err.is_corruption());
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn partial_save_names_keys() {
        let err = SessionError::PartialSave {
            failures: vec![
                KeyFailure {
                    key: "pre-key-1".into(),
                    error: SessionError::Config("x".into()),
                },
                KeyFailure {
                    key: "session-2".into(),
                    error: SessionError::Config("y".into()),
                },
            ],
        };
        assert_eq!(err.to_string(), "2 mutation(s) failed: pre-key-1, session-2");
    }
}
