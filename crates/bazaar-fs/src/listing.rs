//! Directory listing over a flat key space.
//!
//! A directory is never stored. Listing `dir` scans every path that starts
//! with `dir/` and groups each one by the segment that follows the prefix:
//!
//! ```text
//! dir = /dir1            prefix = /dir1/
//!
//! /dir1/file             -> rest "file"            -> file "file"
//! /dir1/subdir/pretty    -> rest "subdir/pretty"   -> dir  "subdir"
//! /dir1/subdir/x/y       -> rest "subdir/x/y"      -> dir  "subdir" (dedup)
//! ```
//!
//! The directory string is matched verbatim; `/dir1/.` lists the children of
//! a directory literally named `.`.

use std::collections::BTreeSet;

use crate::error::FsResult;
use crate::path;
use crate::store::DocumentStore;

/// The directory directly below `prefix` that `full` lives in, if `full`
/// is deeper than a direct child.
fn child_dir<'a>(prefix: &str, full: &'a str) -> Option<&'a str> {
    let rest = full.strip_prefix(prefix)?;
    rest.find(path::SEPARATOR).map(|idx| &rest[..idx])
}

/// Names of files directly inside `dir`, sorted ascending.
///
/// `dir` must already be normalized.
pub fn list_files(store: &dyn DocumentStore, namespace: &str, dir: &str) -> FsResult<Vec<String>> {
    let paths = store.scan_prefix(namespace, &path::child_prefix(dir))?;

    let mut names: Vec<String> = paths
        .iter()
        .map(|p| path::split(p))
        .filter(|(parent, name)| *parent == dir && !name.is_empty())
        .map(|(_, name)| name.to_string())
        .collect();
    names.sort();
    Ok(names)
}

/// Distinct names of directories directly inside `dir`.
///
/// A directory appears once no matter how many descendants it has or how
/// deep they are. Returned sorted, but callers should treat it as a set.
pub fn list_dirs(store: &dyn DocumentStore, namespace: &str, dir: &str) -> FsResult<Vec<String>> {
    let prefix = path::child_prefix(dir);
    let paths = store.scan_prefix(namespace, &prefix)?;

    let dirs: BTreeSet<&str> = paths
        .iter()
        .filter_map(|p| child_dir(&prefix, p))
        .collect();
    Ok(dirs.into_iter().map(str::to_string).collect())
}

/// Every file path below `dir`, at any depth, sorted ascending.
pub fn walk(store: &dyn DocumentStore, namespace: &str, dir: &str) -> FsResult<Vec<String>> {
    let prefix = path::child_prefix(dir);
    let mut paths = store.scan_prefix(namespace, &prefix)?;
    // the root record "/" has no name and is not a file under any directory
    paths.retain(|p| p.len() > prefix.len());
    paths.sort();
    Ok(paths)
}
