//! TOML configuration.
//!
//! ```toml
//! default_namespace = "work"
//!
//! [store]
//! kind = "sqlite"
//! path = "/var/lib/bazaar/files.db"
//! ```
//!
//! Every field is optional. An empty file gives an in-memory store and the
//! default namespace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FsResult;
use crate::fs::FileSystem;
use crate::namespace::DEFAULT_NAMESPACE;
use crate::store::{DocumentStore, MemoryStore, SqliteStore};

/// Store backend kind.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum StoreKind {
    Memory,
    Sqlite,
}

/// Store backend selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Ephemeral in-memory store.
    #[default]
    Memory,
    /// SQLite database file, created if missing.
    Sqlite { path: PathBuf },
}

impl StoreConfig {
    /// The backend kind.
    pub fn kind(&self) -> StoreKind {
        match self {
            StoreConfig::Memory => StoreKind::Memory,
            StoreConfig::Sqlite { .. } => StoreKind::Sqlite,
        }
    }

    /// Open the configured store.
    pub fn open(&self) -> FsResult<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
        };
        Ok(store)
    }
}

/// Filesystem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Namespace used when a caller does not name one.
    pub default_namespace: String,
    /// Store backend.
    pub store: StoreConfig,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl FsConfig {
    /// Config for a SQLite database at `path`.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig::Sqlite { path: path.into() },
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> FsResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FsResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Open the configured store and wrap it in a [`FileSystem`].
    pub fn open(&self) -> FsResult<FileSystem> {
        tracing::info!(kind = %self.store.kind(), "opening store");
        Ok(FileSystem::new(self.store.open()?))
    }
}
