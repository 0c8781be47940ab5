//! The filesystem facade.
//!
//! Every operation normalizes its path first, then either does a point
//! operation on the store or a prefix scan through [`crate::listing`].

use std::sync::Arc;

use crate::error::{FsError, FsResult};
use crate::listing;
use crate::namespace;
use crate::path;
use crate::record::{Extras, FileStat, RecordKey};
use crate::store::{DocumentStore, MemoryStore};

/// Hierarchical file view over a flat [`DocumentStore`].
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct FileSystem {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("store", &"<dyn DocumentStore>")
            .finish()
    }
}

impl FileSystem {
    /// Create a filesystem over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a filesystem over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn key(path: &str, namespace: &str) -> RecordKey {
        RecordKey::new(namespace, path::normalize(path))
    }

    /// Extras must survive a JSON round trip in every store.
    fn check_extras(extras: &Extras) -> FsResult<()> {
        match extras.iter().find(|(_, value)| !value.is_finite()) {
            Some((key, _)) => Err(FsError::other(format!(
                "extras key {key:?} holds a non-finite float"
            ))),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Write `content` at `path`, replacing any previous content.
    ///
    /// Extras of an existing record are left untouched.
    pub fn put(&self, path: &str, content: &[u8], namespace: &str) -> FsResult<()> {
        self.put_with_extras(path, content, namespace, Extras::new())
    }

    /// Write `content` at `path`, seeding `extras` if the record is new.
    ///
    /// When the record already exists only its content changes; use
    /// [`set_extras`](Self::set_extras) to replace extras. Extras holding a
    /// NaN or infinite float are rejected either way.
    #[tracing::instrument(skip(self, content, extras), name = "fs.put")]
    pub fn put_with_extras(
        &self,
        path: &str,
        content: &[u8],
        namespace: &str,
        extras: Extras,
    ) -> FsResult<()> {
        Self::check_extras(&extras)?;
        let key = Self::key(path, namespace);
        self.store.upsert(&key, content, &extras)?;
        tracing::debug!(path = %key.path, size = content.len(), "stored file");
        Ok(())
    }

    /// Read the content at `path`, or `None` if nothing is stored there.
    #[tracing::instrument(skip(self), name = "fs.get")]
    pub fn get(&self, path: &str, namespace: &str) -> FsResult<Option<Vec<u8>>> {
        let key = Self::key(path, namespace);
        Ok(self.store.find(&key)?.map(|record| record.content))
    }

    /// Delete the file at `path`. Removing a missing file is a no-op.
    #[tracing::instrument(skip(self), name = "fs.remove")]
    pub fn remove(&self, path: &str, namespace: &str) -> FsResult<()> {
        let key = Self::key(path, namespace);
        if self.store.delete(&key)? {
            tracing::debug!(path = %key.path, "removed file");
        }
        Ok(())
    }

    /// Check if a file exists at `path`.
    pub fn exists(&self, path: &str, namespace: &str) -> FsResult<bool> {
        self.store.contains(&Self::key(path, namespace))
    }

    /// Size and metadata summary of the file at `path`.
    pub fn stat(&self, path: &str, namespace: &str) -> FsResult<Option<FileStat>> {
        let key = Self::key(path, namespace);
        Ok(self.store.find(&key)?.map(|record| record.stat()))
    }

    // ========================================================================
    // Extras
    // ========================================================================

    /// Extras of the file at `path`; empty if none are set or the file is
    /// missing.
    pub fn get_extras(&self, path: &str, namespace: &str) -> FsResult<Extras> {
        let key = Self::key(path, namespace);
        Ok(self
            .store
            .find(&key)?
            .map(|record| record.extras)
            .unwrap_or_default())
    }

    /// Replace the whole extras map of an existing file.
    ///
    /// Returns false and creates nothing if the file does not exist. Extras
    /// holding a NaN or infinite float are rejected with [`FsError::Other`].
    #[tracing::instrument(skip(self, extras), name = "fs.set_extras")]
    pub fn set_extras(&self, path: &str, namespace: &str, extras: Extras) -> FsResult<bool> {
        Self::check_extras(&extras)?;
        let key = Self::key(path, namespace);
        let updated = self.store.update_extras(&key, &extras)?;
        if !updated {
            tracing::debug!(path = %key.path, "set_extras on missing file ignored");
        }
        Ok(updated)
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Names of files directly inside `dir`, sorted ascending.
    #[tracing::instrument(skip(self), name = "fs.list")]
    pub fn list(&self, dir: &str, namespace: &str) -> FsResult<Vec<String>> {
        listing::list_files(self.store.as_ref(), namespace, &path::normalize(dir))
    }

    /// Names of directories directly inside `dir`. Set semantics.
    #[tracing::instrument(skip(self), name = "fs.list_dirs")]
    pub fn list_dirs(&self, dir: &str, namespace: &str) -> FsResult<Vec<String>> {
        listing::list_dirs(self.store.as_ref(), namespace, &path::normalize(dir))
    }

    /// Full paths of every file below `dir`, sorted ascending.
    pub fn walk(&self, dir: &str, namespace: &str) -> FsResult<Vec<String>> {
        listing::walk(self.store.as_ref(), namespace, &path::normalize(dir))
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Move the file at `path` from `from_namespace` to `to_namespace`.
    ///
    /// Returns false, changing nothing, when the source is missing or the
    /// destination is already taken.
    #[tracing::instrument(skip(self), name = "fs.change_namespace")]
    pub fn change_namespace(
        &self,
        path: &str,
        from_namespace: &str,
        to_namespace: &str,
    ) -> FsResult<bool> {
        namespace::change_namespace(
            self.store.as_ref(),
            &path::normalize(path),
            from_namespace,
            to_namespace,
        )
    }

    /// Namespaces holding at least one file, sorted.
    pub fn namespaces(&self) -> FsResult<Vec<String>> {
        self.store.namespaces()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::DEFAULT_NAMESPACE;
    use crate::record::ExtraValue;

    #[test]
    fn test_paths_are_normalized_before_lookup() {
        let fs = FileSystem::in_memory();
        fs.put("dir1//file", b"a", DEFAULT_NAMESPACE).unwrap();

        assert_eq!(fs.get("/dir1/file", DEFAULT_NAMESPACE).unwrap(), Some(b"a".to_vec()));
        assert!(fs.exists("/dir1/file/", DEFAULT_NAMESPACE).unwrap());
        assert_eq!(fs.list("dir1/", DEFAULT_NAMESPACE).unwrap(), vec!["file"]);
    }

    #[test]
    fn test_put_with_extras_seeds_only_new_records() {
        let fs = FileSystem::in_memory();
        let seeded = Extras::from([("foo".to_string(), ExtraValue::from("bar"))]);
        fs.put_with_extras("/f", b"1", "ns", seeded.clone()).unwrap();

        let ignored = Extras::from([("other".to_string(), ExtraValue::Bool(true))]);
        fs.put_with_extras("/f", b"2", "ns", ignored).unwrap();

        assert_eq!(fs.get("/f", "ns").unwrap(), Some(b"2".to_vec()));
        assert_eq!(fs.get_extras("/f", "ns").unwrap(), seeded);
    }

    #[test]
    fn test_set_extras_on_missing_file_creates_nothing() {
        let fs = FileSystem::in_memory();
        let extras = Extras::from([("foo".to_string(), ExtraValue::from("bar"))]);
        assert!(!fs.set_extras("/missing", DEFAULT_NAMESPACE, extras).unwrap());
        assert!(!fs.exists("/missing", DEFAULT_NAMESPACE).unwrap());
        assert!(fs.get_extras("/missing", DEFAULT_NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_extras_rejected_before_store() {
        let fs = FileSystem::in_memory();
        let bad = Extras::from([("r".to_string(), ExtraValue::Float(f64::NAN))]);

        let err = fs.put_with_extras("/f", b"1", "ns", bad.clone()).unwrap_err();
        assert!(matches!(err, FsError::Other(ref msg) if msg.contains("\"r\"")));
        assert!(!fs.exists("/f", "ns").unwrap());

        fs.put("/f", b"1", "ns").unwrap();
        assert!(fs.set_extras("/f", "ns", bad).is_err());
        assert!(fs.get_extras("/f", "ns").unwrap().is_empty());
    }

    #[test]
    fn test_stat() {
        let fs = FileSystem::in_memory();
        assert!(fs.stat("/f", "ns").unwrap().is_none());

        fs.put("/f", b"hello", "ns").unwrap();
        let stat = fs.stat("f", "ns").unwrap().unwrap();
        assert_eq!(stat.path, "/f");
        assert_eq!(stat.namespace, "ns");
        assert_eq!(stat.size, 5);
        assert_eq!(stat.extras_len, 0);
    }

    #[test]
    fn test_clones_share_store() {
        let fs = FileSystem::in_memory();
        let other = fs.clone();
        fs.put("/shared", b"x", DEFAULT_NAMESPACE).unwrap();
        assert!(other.exists("/shared", DEFAULT_NAMESPACE).unwrap());
    }
}
