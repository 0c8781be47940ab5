//! Document store trait and backends.
//!
//! The store is a flat collection of [`FileRecord`]s keyed by
//! `(namespace, path)`. It knows nothing about directories; the
//! [`FileSystem`](crate::FileSystem) derives those from prefix scans.
//!
//! Every method is a single round trip and atomic for the one record it
//! touches. Paths handed to the store are already normalized.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::FsResult;
use crate::record::{Extras, FileRecord, RecordKey};

/// Query and mutation primitives consumed by the filesystem.
pub trait DocumentStore: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Point lookup by exact key.
    fn find(&self, key: &RecordKey) -> FsResult<Option<FileRecord>>;

    /// Paths in `namespace` that start with `prefix`, in ascending order.
    fn scan_prefix(&self, namespace: &str, prefix: &str) -> FsResult<Vec<String>>;

    /// Distinct namespaces holding at least one record, ascending.
    fn namespaces(&self) -> FsResult<Vec<String>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Insert or replace content at `key`.
    ///
    /// `extras_on_insert` is only applied when the record is created; an
    /// existing record keeps its extras.
    fn upsert(&self, key: &RecordKey, content: &[u8], extras_on_insert: &Extras) -> FsResult<()>;

    /// Delete the record at `key`. Returns whether a record was removed.
    fn delete(&self, key: &RecordKey) -> FsResult<bool>;

    /// Overwrite the extras of an existing record.
    ///
    /// Returns false, without creating anything, when no record exists.
    fn update_extras(&self, key: &RecordKey, extras: &Extras) -> FsResult<bool>;

    /// Rewrite the namespace of the record at `key` to `to`.
    ///
    /// Applies only if `key` exists and `(to, key.path)` does not; the check
    /// and the update happen atomically. Returns whether the move happened.
    fn move_namespace(&self, key: &RecordKey, to: &str) -> FsResult<bool>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if a record exists.
    fn contains(&self, key: &RecordKey) -> FsResult<bool> {
        Ok(self.find(key)?.is_some())
    }
}
