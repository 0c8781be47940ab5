//! Namespaces partition the file space.
//!
//! The same path can exist independently in every namespace. There is no
//! lookup fallback between namespaces, including the default one.

use crate::error::FsResult;
use crate::record::RecordKey;
use crate::store::DocumentStore;

/// The default namespace. Distinct from every non-empty user namespace.
pub const DEFAULT_NAMESPACE: &str = "";

/// Move the record at `path` from one namespace to another.
///
/// Succeeds only when `(from, path)` exists and `(to, path)` does not. On
/// success the record keeps its content and extras. A refusal is reported
/// as `false`, never as an error. `path` must already be normalized.
pub fn change_namespace(
    store: &dyn DocumentStore,
    path: &str,
    from: &str,
    to: &str,
) -> FsResult<bool> {
    let moved = store.move_namespace(&RecordKey::new(from, path), to)?;
    if moved {
        tracing::info!(path, from, to, "moved file to namespace");
    } else {
        tracing::debug!(path, from, to, "namespace move refused");
    }
    Ok(moved)
}
