use std::collections::BTreeMap;

use authstash_codec::RecordValue;
use authstash_types::{KeyCategory, RecordKey};

/// Change to one record.
///
/// Deletion is explicit: `Set(RecordValue::Null)` stores a JSON `null`, it
/// does not remove the record.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Set(RecordValue),
    Delete,
}

impl From<Option<RecordValue>> for Mutation {
    fn from(value: Option<RecordValue>) -> Self {
        value.map_or(Self::Delete, Self::Set)
    }
}

/// Set of record changes applied together by
/// [`SignalKeyStore::save`](crate::SignalKeyStore::save).
///
/// Keyed by category then id; a later change to the same record replaces an
/// earlier one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationBatch {
    entries: BTreeMap<KeyCategory, BTreeMap<String, Mutation>>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a write.
    pub fn set(mut self, category: KeyCategory, id: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.insert(category, id, Mutation::Set(value.into()));
        self
    }

    /// Add a deletion.
    pub fn delete(mut self, category: KeyCategory, id: impl Into<String>) -> Self {
        self.insert(category, id, Mutation::Delete);
        self
    }

    pub fn insert(&mut self, category: KeyCategory, id: impl Into<String>, mutation: Mutation) {
        self.entries
            .entry(category)
            .or_default()
            .insert(id.into(), mutation);
    }

    /// Number of record changes.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutation for one record, if present.
    pub fn get(&self, category: KeyCategory, id: &str) -> Option<&Mutation> {
        self.entries.get(&category)?.get(id)
    }

    /// Iterate changes in category then id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordKey, &Mutation)> + '_ {
        self.entries.iter().flat_map(|(category, ids)| {
            ids.iter()
                .map(move |(id, m)| (RecordKey::signal(*category, id.clone()), m))
        })
    }
}

impl IntoIterator for MutationBatch {
    type Item = (RecordKey, Mutation);
    type IntoIter = std::vec::IntoIter<(RecordKey, Mutation)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .flat_map(|(category, ids)| {
                ids.into_iter()
                    .map(move |(id, m)| (RecordKey::signal(category, id), m))
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_mutations() {
        let batch = MutationBatch::new()
            .set(KeyCategory::PreKey, "1", RecordValue::from("a"))
            .delete(KeyCategory::PreKey, "2")
            .set(KeyCategory::Session, "x", RecordValue::from(true));
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(KeyCategory::PreKey, "2"), Some(&Mutation::Delete));
        assert!(batch.get(KeyCategory::SenderKey, "1").is_none());
    }

    #[test]
    fn later_change_replaces_earlier() {
        let batch = MutationBatch::new()
            .set(KeyCategory::PreKey, "1", RecordValue::from("a"))
            .delete(KeyCategory::PreKey, "1");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get(KeyCategory::PreKey, "1"), Some(&Mutation::Delete));
    }

    #[test]
    fn null_set_is_not_delete() {
        let batch = MutationBatch::new().set(KeyCategory::PreKey, "1", RecordValue::Null);
        assert_eq!(
            batch.get(KeyCategory::PreKey, "1"),
            Some(&Mutation::Set(RecordValue::Null))
        );
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Mutation::from(None), Mutation::Delete);
        assert_eq!(
            Mutation::from(Some(RecordValue::from(1u64))),
            Mutation::Set(RecordValue::from(1u64))
        );
    }

    #[test]
    fn into_iter_yields_record_keys() {
        let batch = MutationBatch::new()
            .delete(KeyCategory::Session, "b")
            .delete(KeyCategory::PreKey, "a");
        let keys: Vec<String> = batch.into_iter().map(|(k, _)| k.storage_name()).collect();
        assert_eq!(keys, vec!["pre-key-a", "session-b"]);
    }

    #[test]
    fn empty_batch() {
        let batch = MutationBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.iter().count(), 0);
    }
}
