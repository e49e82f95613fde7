use std::fmt;

use crate::category::KeyCategory;
use crate::error::{TypeError, TypeResult};
use crate::names::normalize_key_name;

/// Storage name of the singleton credentials record.
pub const CREDS_NAME: &str = "creds";

/// Logical name of one stored record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    /// The per-session credentials bundle. Has no id.
    Creds,
    /// One piece of signal key material.
    Signal { category: KeyCategory, id: String },
}

impl RecordKey {
    /// Key for `(category, id)`.
    pub fn signal(category: KeyCategory, id: impl Into<String>) -> Self {
        Self::Signal {
            category,
            id: id.into(),
        }
    }

    /// Returns `true` for the credentials record.
    pub fn is_creds(&self) -> bool {
        matches!(self, Self::Creds)
    }

    /// The category, or `None` for credentials.
    pub fn category(&self) -> Option<KeyCategory> {
        match self {
            Self::Creds => None,
            Self::Signal { category, .. } => Some(*category),
        }
    }

    /// Flattened, not yet normalized name: `creds` or `<category>-<id>`.
    pub fn storage_name(&self) -> String {
        match self {
            Self::Creds => CREDS_NAME.to_string(),
            Self::Signal { category, id } => format!("{category}-{id}"),
        }
    }

    /// Check that this key cannot collide with any other key once
    /// normalized.
    ///
    /// Normalization is injective for ids over `[A-Za-z0-9@.+:/_]` where no
    /// `_` touches another `_` or a `/`: `:` is then the only source of `-`
    /// and `/` the only source of `__` in the output. The one
    /// remaining ambiguity is a category whose flattened name reads as a
    /// longer category's prefix, e.g. `sender-key` + `memory:x` against
    /// `sender-key-memory` + `x`; the longer category owns such names.
    pub fn check_unambiguous(&self) -> TypeResult<()> {
        let Self::Signal { category, id } = self else {
            return Ok(());
        };
        if id.is_empty() {
            return Err(TypeError::EmptyRecordId);
        }
        if let Some(ch) = id.chars().find(|c| !is_portable_id_char(*c)) {
            return Err(TypeError::AmbiguousKey {
                name: self.storage_name(),
                reason: format!("id contains {ch:?} outside [A-Za-z0-9@.+:/_]"),
            });
        }
        if id.contains("__") || id.contains("_/") || id.contains("/_") {
            return Err(TypeError::AmbiguousKey {
                name: self.storage_name(),
                reason: "'_' adjacent to '_' or '/'".into(),
            });
        }

        let normalized = normalize_key_name(&self.storage_name()).unwrap_or_default();
        let own_len = category.as_str().len();
        for other in KeyCategory::ALL {
            let prefix = other.as_str();
            if prefix.len() > own_len
                && normalized.len() > prefix.len()
                && normalized.starts_with(prefix)
                && normalized.as_bytes()[prefix.len()] == b'-'
            {
                return Err(TypeError::AmbiguousKey {
                    name: self.storage_name(),
                    reason: format!("reads as a {other} key"),
                });
            }
        }
        Ok(())
    }
}

fn is_portable_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | ':' | '/' | '_')
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn creds_storage_name() {
        assert_eq!(RecordKey::Creds.storage_name(), "creds");
        assert!(RecordKey::Creds.is_creds());
        assert_eq!(RecordKey::Creds.category(), None);
    }

    #[test]
    fn signal_storage_name() {
        let key = RecordKey::signal(KeyCategory::PreKey, "5");
        assert_eq!(key.storage_name(), "pre-key-5");
        assert_eq!(key.to_string(), "pre-key-5");
        assert_eq!(key.category(), Some(KeyCategory::PreKey));
    }

    #[test]
    fn typical_protocol_ids_are_unambiguous() {
        let keys = [
            RecordKey::signal(KeyCategory::Session, "5511999999999.0"),
            RecordKey::signal(KeyCategory::Session, "5511999999999:12@s.whatsapp.net"),
            RecordKey::signal(KeyCategory::SenderKey, "120363@g.us::5511999999999::0"),
            RecordKey::signal(KeyCategory::SenderKeyMemory, "120363@g.us"),
            RecordKey::signal(KeyCategory::AppStateSyncKey, "AAAAAPXi"),
            RecordKey::signal(KeyCategory::AppStateSyncVersion, "regular_high"),
        ];
        for key in &keys {
            assert!(key.check_unambiguous().is_ok(), "{key}");
        }
    }

    #[test]
    fn underscore_next_to_slash_is_ambiguous() {
        let a = RecordKey::signal(KeyCategory::PreKey, "a_/b");
        let b = RecordKey::signal(KeyCategory::PreKey, "a/_b");
        assert!(a.check_unambiguous().is_err());
        assert!(b.check_unambiguous().is_err());
        assert!(RecordKey::signal(KeyCategory::PreKey, "a__b")
            .check_unambiguous()
            .is_err());
    }

    #[test]
    fn empty_id_rejected() {
        let key = RecordKey::signal(KeyCategory::PreKey, "");
        assert_eq!(key.check_unambiguous(), Err(TypeError::EmptyRecordId));
    }

    #[test]
    fn dash_in_id_is_ambiguous() {
        let key = RecordKey::signal(KeyCategory::PreKey, "a-b");
        assert!(matches!(
            key.check_unambiguous(),
            Err(TypeError::AmbiguousKey { .. })
        ));
    }

    #[test]
    fn shadowed_category_prefix_is_ambiguous() {
        let shadowed = RecordKey::signal(KeyCategory::SenderKey, "memory:x");
        let owner = RecordKey::signal(KeyCategory::SenderKeyMemory, "x");
        assert!(shadowed.check_unambiguous().is_err());
        assert!(owner.check_unambiguous().is_ok());
        assert_eq!(
            normalize_key_name(&shadowed.storage_name()),
            normalize_key_name(&owner.storage_name())
        );
    }

    #[test]
    fn creds_always_unambiguous() {
        assert!(RecordKey::Creds.check_unambiguous().is_ok());
    }

    fn category_strategy() -> impl Strategy<Value = KeyCategory> {
        (0..KeyCategory::ALL.len()).prop_map(|i| KeyCategory::ALL[i])
    }

    proptest! {
        #[test]
        fn unambiguous_keys_never_collide(
            a_cat in category_strategy(),
            a_id in "[A-Za-z0-9@.+:/_]{1,16}",
            b_cat in category_strategy(),
            b_id in "[A-Za-z0-9@.+:/_]{1,16}",
        ) {
            let a = RecordKey::signal(a_cat, a_id);
            let b = RecordKey::signal(b_cat, b_id);
            prop_assume!(a != b);
            prop_assume!(a.check_unambiguous().is_ok() && b.check_unambiguous().is_ok());
            prop_assert_ne!(
                normalize_key_name(&a.storage_name()),
                normalize_key_name(&b.storage_name())
            );
        }
    }
}
