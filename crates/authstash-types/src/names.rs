//! Backend-safe record names and storage locations.
//!
//! Record ids come from the protocol client and may contain `/` (base64
//! key ids) or `:` (device-qualified addresses). Neither is safe inside a
//! filesystem path or an object key, so names are normalized:
//!
//! - `/` becomes `__`
//! - `:` becomes `-`

use std::fmt;

use crate::session::SessionId;

/// Normalize a record name for use in a path or object key.
///
/// Returns `None` for an empty name rather than an empty string, which
/// would be indistinguishable from a real (empty) key.
///
/// # Examples
///
/// ```
/// use authstash_types::normalize_key_name;
///
/// assert_eq!(normalize_key_name("session-123:4@s.whatsapp.net").as_deref(),
///            Some("session-123-4@s.whatsapp.net"));
/// assert_eq!(normalize_key_name("app-state-sync-key-ab/cd").as_deref(),
///            Some("app-state-sync-key-ab__cd"));
/// assert_eq!(normalize_key_name(""), None);
/// ```
pub fn normalize_key_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    Some(name.replace('/', "__").replace(':', "-"))
}

/// File name of a record inside a session directory: `<normalized>.json`.
pub fn local_file_name(storage_name: &str) -> Option<String> {
    normalize_key_name(storage_name).map(|name| format!("{name}.json"))
}

/// Fully-qualified location of a record in the object store.
///
/// The object key repeats the bucket name as its first path segment:
/// `<bucket>/sessions/<sessionId>-<normalized>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    bucket: String,
    key: String,
}

impl ObjectLocation {
    /// Compose the location of `storage_name` for `session` in `bucket`.
    ///
    /// Returns `None` if `storage_name` is empty.
    pub fn compose(bucket: &str, session: &SessionId, storage_name: &str) -> Option<Self> {
        let name = normalize_key_name(storage_name)?;
        Some(Self {
            bucket: bucket.to_string(),
            key: format!("{bucket}/sessions/{session}-{name}.json"),
        })
    }

    /// Bucket the object lives in.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key within the bucket.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    #[test]
    fn normalize_replaces_slash_and_colon() {
        assert_eq!(normalize_key_name("a/b:c").as_deref(), Some("a__b-c"));
        assert_eq!(normalize_key_name("//").as_deref(), Some("____"));
        assert_eq!(normalize_key_name("::").as_deref(), Some("--"));
    }

    #[test]
    fn normalize_is_identity_on_safe_names() {
        assert_eq!(normalize_key_name("pre-key-5").as_deref(), Some("pre-key-5"));
    }

    #[test]
    fn normalize_empty_is_none() {
        assert_eq!(normalize_key_name(""), None);
        assert_eq!(local_file_name(""), None);
    }

    #[test]
    fn local_file_name_appends_json() {
        assert_eq!(
            local_file_name("session-1:2").as_deref(),
            Some("session-1-2.json")
        );
    }

    #[test]
    fn compose_creds_location() {
        let loc = ObjectLocation::compose("my-bucket", &sid("testId"), "creds").unwrap();
        assert_eq!(loc.bucket(), "my-bucket");
        assert_eq!(loc.key(), "my-bucket/sessions/testId-creds.json");
        assert_eq!(loc.to_string(), loc.key());
    }

    #[test]
    fn compose_signal_location() {
        let loc = ObjectLocation::compose("b", &sid("s1"), "pre-key-5").unwrap();
        assert_eq!(loc.key(), "b/sessions/s1-pre-key-5.json");
    }

    #[test]
    fn compose_normalizes_name() {
        let loc = ObjectLocation::compose("b", &sid("s1"), "session-1:2").unwrap();
        assert_eq!(loc.key(), "b/sessions/s1-session-1-2.json");
    }

    #[test]
    fn compose_empty_name_is_none() {
        assert!(ObjectLocation::compose("b", &sid("s1"), "").is_none());
    }

    #[test]
    fn distinct_sessions_never_share_locations() {
        let a = ObjectLocation::compose("b", &sid("a"), "pre-key-1").unwrap();
        let b = ObjectLocation::compose("b", &sid("a_pre"), "key-1").unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn normalize_is_deterministic(name in "[ -~]{1,32}") {
            prop_assert_eq!(normalize_key_name(&name), normalize_key_name(&name));
        }

        #[test]
        fn normalized_names_are_path_safe(name in "[ -~]{1,32}") {
            let out = normalize_key_name(&name).unwrap();
            prop_assert!(!out.contains('/'));
            prop_assert!(!out.contains(':'));
        }
    }
}
