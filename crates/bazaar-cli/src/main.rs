//! bazaar command-line client.
//!
//! Usage:
//!   # Store a file in the default SQLite database
//!   echo hello | bazaar put /notes/today
//!
//!   # Read it back, list a directory
//!   bazaar get /notes/today
//!   bazaar ls /notes
//!
//!   # Work in a namespace, then publish a file
//!   bazaar -n draft put /post.md post.md
//!   bazaar mv-ns /post.md draft published
//!
//! The store comes from `--config <file>`, `--memory` or `--db <file>`, in
//! that order, falling back to `<data dir>/bazaar/bazaar.db`.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use bazaar_fs::{Extras, FileSystem, FsConfig, StoreConfig};

/// Path-addressed file store.
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(about = "Path-addressed virtual filesystem over a document store")]
struct Args {
    /// TOML config file selecting the store
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (ignored when --config or --memory is given)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use an ephemeral in-memory store
    #[arg(long, global = true)]
    memory: bool,

    /// Namespace to operate in (defaults to the config's default namespace)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a file from a local file or stdin
    Put {
        path: String,
        /// Local file to read; stdin when omitted
        source: Option<PathBuf>,
    },
    /// Print a file's content to stdout
    Get { path: String },
    /// Remove a file
    Rm { path: String },
    /// Exit 0 if the file exists, 1 otherwise
    Exists { path: String },
    /// List files directly inside a directory
    Ls {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// List directories directly inside a directory
    Dirs {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// List every file path below a directory
    Walk {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// Show size and metadata summary of a file
    Stat { path: String },
    /// Print a file's extras as JSON
    Extras { path: String },
    /// Replace a file's extras with a JSON object
    SetExtras { path: String, json: String },
    /// Move a file between namespaces
    MvNs {
        path: String,
        from: String,
        to: String,
    },
    /// List namespaces that hold files
    Namespaces,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries file content
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve the store configuration from the command-line flags.
fn resolve_config(args: &Args) -> Result<FsConfig> {
    if let Some(path) = &args.config {
        return FsConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    if args.memory {
        return Ok(FsConfig::default());
    }

    let db = match &args.db {
        Some(db) => db.clone(),
        None => dirs::data_dir()
            .context("no data directory on this platform; pass --db")?
            .join("bazaar")
            .join("bazaar.db"),
    };
    if let Some(parent) = db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(FsConfig::sqlite(db))
}

fn run(args: Args) -> Result<ExitCode> {
    let config = resolve_config(&args)?;
    if let StoreConfig::Sqlite { path } = &config.store {
        tracing::debug!(db = %path.display(), "using sqlite store");
    }
    let fs: FileSystem = config.open().context("opening store")?;
    let ns = args.namespace.as_deref().unwrap_or(config.default_namespace.as_str());

    let mut stdout = std::io::stdout().lock();

    match args.command {
        Command::Put { path, source } => {
            let content = match source {
                Some(source) => std::fs::read(&source)
                    .with_context(|| format!("reading {}", source.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
                    buf
                }
            };
            fs.put(&path, &content, ns)?;
        }
        Command::Get { path } => match fs.get(&path, ns)? {
            Some(content) => stdout.write_all(&content)?,
            None => {
                tracing::error!(path = %path, namespace = ns, "file not found");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Rm { path } => fs.remove(&path, ns)?,
        Command::Exists { path } => {
            if !fs.exists(&path, ns)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Ls { dir } => {
            for name in fs.list(&dir, ns)? {
                writeln!(stdout, "{name}")?;
            }
        }
        Command::Dirs { dir } => {
            for name in fs.list_dirs(&dir, ns)? {
                writeln!(stdout, "{name}/")?;
            }
        }
        Command::Walk { dir } => {
            for path in fs.walk(&dir, ns)? {
                writeln!(stdout, "{path}")?;
            }
        }
        Command::Stat { path } => match fs.stat(&path, ns)? {
            Some(stat) => writeln!(stdout, "{}", serde_json::to_string_pretty(&stat)?)?,
            None => {
                tracing::error!(path = %path, namespace = ns, "file not found");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Extras { path } => {
            let extras = fs.get_extras(&path, ns)?;
            writeln!(stdout, "{}", serde_json::to_string_pretty(&extras)?)?;
        }
        Command::SetExtras { path, json } => {
            let extras: Extras =
                serde_json::from_str(&json).context("extras must be a JSON object")?;
            if !fs.set_extras(&path, ns, extras)? {
                tracing::error!(path = %path, namespace = ns, "file not found");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::MvNs { path, from, to } => {
            if !fs.change_namespace(&path, &from, &to)? {
                tracing::error!(path = %path, from = %from, to = %to, "source missing or destination taken");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Namespaces => {
            for namespace in fs.namespaces()? {
                // the default namespace is the empty string
                let shown = if namespace.is_empty() { "(default)" } else { namespace.as_str() };
                writeln!(stdout, "{shown}")?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["bazaar", "ls", "/dir1", "-n", "test", "--memory"]).unwrap();
        assert!(args.memory);
        assert_eq!(args.namespace.as_deref(), Some("test"));
        assert!(matches!(args.command, Command::Ls { ref dir } if dir == "/dir1"));
    }

    #[test]
    fn test_resolve_config_prefers_memory_flag() {
        let args = Args::try_parse_from(["bazaar", "--memory", "namespaces"]).unwrap();
        assert_eq!(resolve_config(&args).unwrap().store, StoreConfig::Memory);
    }

    #[test]
    fn test_resolve_config_memory_wins_over_db() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("unused").join("files.db");
        let args = Args::try_parse_from([
            OsStr::new("bazaar"),
            OsStr::new("--db"),
            db.as_os_str(),
            OsStr::new("--memory"),
            OsStr::new("ls"),
        ])
        .unwrap();

        assert_eq!(resolve_config(&args).unwrap().store, StoreConfig::Memory);
        assert!(!dir.path().join("unused").exists());
    }

    #[test]
    fn test_resolve_config_db_flag_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("files.db");
        let args = Args::try_parse_from([
            OsStr::new("bazaar"),
            OsStr::new("--db"),
            db.as_os_str(),
            OsStr::new("walk"),
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.store, StoreConfig::Sqlite { path: db.clone() });
        assert!(dir.path().join("nested").is_dir());
    }
}
