//! Path normalization.
//!
//! Paths are plain strings split on `/`. Segments are never interpreted:
//! `.`, `..` and `$dir` are ordinary names, so `/dir1/.` and `/dir1` are
//! two different directories. This is pure string hierarchy, not POSIX
//! resolution.

/// Path separator.
pub const SEPARATOR: char = '/';

/// The root directory.
pub const ROOT: &str = "/";

/// Canonicalize a path string.
///
/// The result starts with `/`, has no repeated separators and no trailing
/// separator (the root itself excepted). Never fails; `""` becomes `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

/// Split a normalized path into `(directory, name)`.
///
/// `name` is everything after the last `/`; `directory` is everything
/// before it, or `/` when that would be empty.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind(SEPARATOR) {
        Some(0) => (ROOT, &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (ROOT, path),
    }
}

/// The prefix every path strictly below `dir` starts with.
pub fn child_prefix(dir: &str) -> String {
    if dir == ROOT {
        ROOT.to_string()
    } else {
        format!("{dir}{SEPARATOR}")
    }
}
