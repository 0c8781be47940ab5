//! # bazaar-fs
//!
//! A path-addressed virtual filesystem over a flat document store.
//!
//! The store only knows records keyed by `(namespace, path)`. Everything
//! hierarchical is derived from the path strings:
//!
//! - [`FileSystem`] - the public operation surface (put/get/list/...)
//! - [`DocumentStore`] - query and mutation primitives a store must provide
//! - [`MemoryStore`] - in-memory store (testing, ephemeral use)
//! - [`SqliteStore`] - SQLite-backed store
//! - [`FsConfig`] - TOML configuration selecting a store
//!
//! ## Design Decisions
//!
//! - **Directories are derived**: no directory records exist. A directory
//!   is any prefix of a stored path, found with a prefix scan.
//! - **Literal segments**: `.` and `..` are ordinary names. Only repeated,
//!   leading and trailing separators are normalized.
//! - **Namespaces isolate**: the same path can live in many namespaces and
//!   lookups never fall back across them.
//! - **Extras survive writes**: rewriting content keeps the extras map;
//!   only [`FileSystem::set_extras`] replaces it.

pub mod config;
mod error;
pub mod fs;
pub mod listing;
pub mod namespace;
pub mod path;
pub mod record;
pub mod store;

pub use config::{FsConfig, StoreConfig, StoreKind};
pub use error::{FsError, FsResult};
pub use fs::FileSystem;
pub use namespace::DEFAULT_NAMESPACE;
pub use record::{ExtraValue, Extras, FileRecord, FileStat, RecordKey};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
