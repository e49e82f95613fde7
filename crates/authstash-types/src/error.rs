use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown key category: {0}")]
    UnknownCategory(String),

    #[error("invalid session id {id:?}: {reason}")]
    InvalidSessionId { id: String, reason: String },

    #[error("record id must not be empty")]
    EmptyRecordId,

    #[error("storage name {name:?} is ambiguous: {reason}")]
    AmbiguousKey { name: String, reason: String },
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
