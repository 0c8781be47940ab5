//! SQLite document store.
//!
//! One flat `files` table keyed by `(namespace, path)`. Prefix scans are
//! served from the primary-key index as a half-open `path` range, so no
//! directory rows or secondary indexes are needed.

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::error::FsResult;
use crate::record::{Extras, FileRecord, RecordKey};
use crate::store::DocumentStore;

const SCHEMA: &str = r#"
-- Files (flat, hierarchy is derived from path)
CREATE TABLE IF NOT EXISTS files (
    namespace TEXT NOT NULL,
    path TEXT NOT NULL,
    content BLOB NOT NULL,
    extras TEXT,
    created_at INTEGER DEFAULT (unixepoch()),
    updated_at INTEGER DEFAULT (unixepoch()),
    PRIMARY KEY (namespace, path)
);
"#;

/// Database handle for file records.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("conn", &"<locked>")
            .finish()
    }
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> FsResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(path = %path.as_ref().display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> FsResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn encode_extras(extras: &Extras) -> FsResult<Option<String>> {
        if extras.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::to_string(extras)?))
        }
    }

    fn decode_extras(raw: Option<String>) -> FsResult<Extras> {
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Extras::new()),
        }
    }
}

/// Smallest string greater than every string starting with `prefix`.
///
/// `None` means the range is unbounded above.
fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let mut next = last as u32 + 1;
        // skip the surrogate gap
        if (0xD800..=0xDFFF).contains(&next) {
            next = 0xE000;
        }
        if let Some(c) = char::from_u32(next) {
            chars.push(c);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

impl DocumentStore for SqliteStore {
    fn find(&self, key: &RecordKey) -> FsResult<Option<FileRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT content, extras FROM files WHERE namespace = ?1 AND path = ?2",
                params![key.namespace, key.path],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;

        match row {
            Some((content, extras)) => Ok(Some(FileRecord {
                path: key.path.clone(),
                namespace: key.namespace.clone(),
                content,
                extras: Self::decode_extras(extras)?,
            })),
            None => Ok(None),
        }
    }

    fn scan_prefix(&self, namespace: &str, prefix: &str) -> FsResult<Vec<String>> {
        let conn = self.conn.lock();
        let paths = match prefix_upper_bound(prefix) {
            Some(upper) => {
                let mut stmt = conn.prepare(
                    "SELECT path FROM files
                     WHERE namespace = ?1 AND path >= ?2 AND path < ?3
                     ORDER BY path",
                )?;
                let rows = stmt.query_map(params![namespace, prefix, upper], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT path FROM files WHERE namespace = ?1 AND path >= ?2 ORDER BY path",
                )?;
                let rows = stmt.query_map(params![namespace, prefix], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()?
            }
        };
        Ok(paths)
    }

    fn namespaces(&self) -> FsResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT DISTINCT namespace FROM files ORDER BY namespace")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    fn upsert(&self, key: &RecordKey, content: &[u8], extras_on_insert: &Extras) -> FsResult<()> {
        let extras = Self::encode_extras(extras_on_insert)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO files (namespace, path, content, extras)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace, path)
             DO UPDATE SET content = excluded.content, updated_at = unixepoch()",
            params![key.namespace, key.path, content, extras],
        )?;
        Ok(())
    }

    fn delete(&self, key: &RecordKey) -> FsResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "DELETE FROM files WHERE namespace = ?1 AND path = ?2",
            params![key.namespace, key.path],
        )?;
        Ok(changed > 0)
    }

    fn update_extras(&self, key: &RecordKey, extras: &Extras) -> FsResult<bool> {
        let encoded = Self::encode_extras(extras)?;
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE files SET extras = ?3, updated_at = unixepoch()
             WHERE namespace = ?1 AND path = ?2",
            params![key.namespace, key.path, encoded],
        )?;
        Ok(changed > 0)
    }

    fn move_namespace(&self, key: &RecordKey, to: &str) -> FsResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE files SET namespace = ?3, updated_at = unixepoch()
             WHERE namespace = ?1 AND path = ?2
               AND NOT EXISTS (SELECT 1 FROM files WHERE namespace = ?3 AND path = ?2)",
            params![key.namespace, key.path, to],
        )?;
        Ok(changed > 0)
    }
}
