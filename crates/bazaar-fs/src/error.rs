//! Filesystem error types.
//!
//! Absence and namespace conflicts are not errors: lookups return `Option`
//! or empty collections and `change_namespace` returns `bool`. What lands
//! here are failures of the store collaborator, surfaced unmodified, and
//! extras rejected before they reach it.

use std::io;
use thiserror::Error;

/// Filesystem error type.
#[derive(Debug, Error)]
pub enum FsError {
    /// SQLite store failure (connection, statement, constraint).
    #[error("sqlite store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored extras could not be encoded or decoded.
    #[error("extras encoding error: {0}")]
    Extras(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error, such as extras holding a value no store can keep.
    #[error("{0}")]
    Other(String),
}

impl FsError {
    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Filesystem result type.
pub type FsResult<T> = Result<T, FsError>;
