use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Identifier of one messaging session.
///
/// Restricted to ASCII alphanumerics, `_` and `.` (not leading) so that the
/// first `-` in an object key always ends the session part and the id is
/// safe as a directory name. Dashed ids such as UUIDs go through
/// [`SessionId::normalized`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session id.
    pub fn new(id: impl Into<String>) -> TypeResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidSessionId {
                id,
                reason: "must not be empty".into(),
            });
        }
        if id.starts_with('.') {
            return Err(TypeError::InvalidSessionId {
                id,
                reason: "must not start with '.'".into(),
            });
        }
        if let Some(ch) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.')))
        {
            return Err(TypeError::InvalidSessionId {
                reason: format!("contains forbidden character: {ch:?}"),
                id,
            });
        }
        Ok(Self(id))
    }

    /// Validate `id` after replacing every `-` with `_`.
    ///
    /// `a-b` and `a_b` name the same session afterwards; callers mixing both
    /// spellings must keep them apart themselves.
    pub fn normalized(id: &str) -> TypeResult<Self> {
        Self::new(id.replace('-', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
