//! SQLite storage bootstrap for the durable registry backend.
//!
//! # Responsibility
//! - Open the writer, reader and in-memory connections used by `SqliteTaxpayerStore`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No registry data is read or written before migrations succeed.
//! - File databases run in WAL mode so readers never wait on the writer.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_read_only};

pub type DbResult<T> = Result<T, DbError>;

/// How a registry connection was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// Read-write file connection; runs migrations.
    File(PathBuf),
    /// Read-only file connection used by the reader pool.
    ReadOnly(PathBuf),
    /// Private in-memory database.
    Memory,
}

impl OpenTarget {
    /// Short label used in `db_open` log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::ReadOnly(_) => "read_only",
            Self::Memory => "memory",
        }
    }
}

impl Display for OpenTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "registry database `{}`", path.display()),
            Self::ReadOnly(path) => {
                write!(f, "registry database `{}` (read-only)", path.display())
            }
            Self::Memory => f.write_str("in-memory registry database"),
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// The connection itself could not be established.
    Open {
        target: OpenTarget,
        source: rusqlite::Error,
    },
    /// A pragma, migration or query failed on an open connection.
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code emitted as `error_code` in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Sqlite(_) => "db_sqlite_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "failed to open {target}: {source}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "registry schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
