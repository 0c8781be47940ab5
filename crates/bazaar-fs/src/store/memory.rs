//! In-memory document store.
//!
//! Used for testing and ephemeral filesystems. All data is lost on drop.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::FsResult;
use crate::record::{Extras, FileRecord, RecordKey};
use crate::store::DocumentStore;

/// Stored document body; the key carries path and namespace.
#[derive(Debug, Clone)]
struct Document {
    content: Vec<u8>,
    extras: Extras,
}

impl Document {
    fn to_record(&self, key: &RecordKey) -> FileRecord {
        FileRecord {
            path: key.path.clone(),
            namespace: key.namespace.clone(),
            content: self.content.clone(),
            extras: self.extras.clone(),
        }
    }
}

/// In-memory document store.
///
/// Records are kept in a `BTreeMap` ordered by `(namespace, path)`, so a
/// prefix scan is a range walk. Thread-safe via internal `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<RecordKey, Document>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all namespaces.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, key: &RecordKey) -> FsResult<Option<FileRecord>> {
        let docs = self.docs.read();
        Ok(docs.get(key).map(|doc| doc.to_record(key)))
    }

    fn scan_prefix(&self, namespace: &str, prefix: &str) -> FsResult<Vec<String>> {
        let docs = self.docs.read();
        let start = RecordKey::new(namespace, prefix);
        let paths = docs
            .range((Bound::Included(start), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.namespace == namespace && key.path.starts_with(prefix))
            .map(|key| key.path.clone())
            .collect();
        Ok(paths)
    }

    fn namespaces(&self) -> FsResult<Vec<String>> {
        let docs = self.docs.read();
        let mut namespaces: Vec<String> = Vec::new();
        for key in docs.keys() {
            // keys are namespace-ordered, so duplicates are adjacent
            if namespaces.last() != Some(&key.namespace) {
                namespaces.push(key.namespace.clone());
            }
        }
        Ok(namespaces)
    }

    fn upsert(&self, key: &RecordKey, content: &[u8], extras_on_insert: &Extras) -> FsResult<()> {
        let mut docs = self.docs.write();
        match docs.get_mut(key) {
            Some(doc) => {
                doc.content = content.to_vec();
            }
            None => {
                docs.insert(
                    key.clone(),
                    Document {
                        content: content.to_vec(),
                        extras: extras_on_insert.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    fn delete(&self, key: &RecordKey) -> FsResult<bool> {
        Ok(self.docs.write().remove(key).is_some())
    }

    fn update_extras(&self, key: &RecordKey, extras: &Extras) -> FsResult<bool> {
        let mut docs = self.docs.write();
        match docs.get_mut(key) {
            Some(doc) => {
                doc.extras = extras.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn move_namespace(&self, key: &RecordKey, to: &str) -> FsResult<bool> {
        let target = RecordKey::new(to, key.path.clone());

        let mut docs = self.docs.write();
        if docs.contains_key(&target) {
            return Ok(false);
        }
        match docs.remove(key) {
            Some(doc) => {
                docs.insert(target, doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ExtraValue;

    fn key(ns: &str, path: &str) -> RecordKey {
        RecordKey::new(ns, path)
    }

    #[test]
    fn test_upsert_and_find() {
        let store = MemoryStore::new();
        store.upsert(&key("", "/a"), b"hello", &Extras::new()).unwrap();

        let record = store.find(&key("", "/a")).unwrap().unwrap();
        assert_eq!(record.content, b"hello");
        assert_eq!(record.namespace, "");
        assert!(store.find(&key("other", "/a")).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_keeps_existing_extras() {
        let store = MemoryStore::new();
        let first = Extras::from([("foo".to_string(), ExtraValue::from("bar"))]);
        store.upsert(&key("", "/a"), b"1", &first).unwrap();
        store.upsert(&key("", "/a"), b"2", &Extras::new()).unwrap();

        let record = store.find(&key("", "/a")).unwrap().unwrap();
        assert_eq!(record.content, b"2");
        assert_eq!(record.extras, first);
    }

    #[test]
    fn test_scan_prefix_stays_in_namespace() {
        let store = MemoryStore::new();
        for (ns, path) in [("", "/d/a"), ("", "/d/b/c"), ("", "/e"), ("x", "/d/z")] {
            store.upsert(&key(ns, path), b"", &Extras::new()).unwrap();
        }

        assert_eq!(store.scan_prefix("", "/d/").unwrap(), vec!["/d/a", "/d/b/c"]);
        assert_eq!(store.scan_prefix("x", "/d/").unwrap(), vec!["/d/z"]);
        assert!(store.scan_prefix("y", "/").unwrap().is_empty());
    }

    #[test]
    fn test_update_extras_does_not_create() {
        let store = MemoryStore::new();
        let extras = Extras::from([("foo".to_string(), ExtraValue::from("bar"))]);
        assert!(!store.update_extras(&key("", "/missing"), &extras).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_move_namespace_guards() {
        let store = MemoryStore::new();
        store.upsert(&key("a", "/f"), b"x", &Extras::new()).unwrap();

        assert!(store.move_namespace(&key("a", "/f"), "b").unwrap());
        assert!(!store.contains(&key("a", "/f")).unwrap());
        assert!(store.contains(&key("b", "/f")).unwrap());

        // missing source
        assert!(!store.move_namespace(&key("a", "/f"), "b").unwrap());

        // occupied destination
        store.upsert(&key("a", "/f"), b"y", &Extras::new()).unwrap();
        assert!(!store.move_namespace(&key("a", "/f"), "b").unwrap());
        assert_eq!(store.find(&key("b", "/f")).unwrap().unwrap().content, b"x");
    }

    #[test]
    fn test_namespaces() {
        let store = MemoryStore::new();
        for (ns, path) in [("b", "/1"), ("a", "/1"), ("a", "/2"), ("", "/3")] {
            store.upsert(&key(ns, path), b"", &Extras::new()).unwrap();
        }
        assert_eq!(store.namespaces().unwrap(), vec!["", "a", "b"]);
    }
}
