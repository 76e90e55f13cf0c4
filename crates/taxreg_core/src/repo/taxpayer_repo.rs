//! Taxpayer store contract and error taxonomy.
//!
//! Field validation is not part of this contract; callers (the registry
//! service) validate before calling `insert`.

use crate::db::DbError;
use crate::model::taxpayer::{TaxpayerRecord, Tid};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for taxpayer persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    /// A record with this `tid` is already stored.
    DuplicateKey(Tid),
    Db(DbError),
    /// Persisted row violates record invariants.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(tid) => write!(f, "taxpayer already registered: {tid}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted taxpayer data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with `open_db`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Authoritative keyed collection of taxpayer records.
///
/// Implementations must be safe to share across threads: `insert` is
/// serialized against every other operation, reads may run concurrently.
pub trait TaxpayerStore: Send + Sync {
    /// Stores `record` unless its `tid` is already present.
    ///
    /// Returns `RepoError::DuplicateKey` and leaves the store unchanged when
    /// the key exists.
    fn insert(&self, record: &TaxpayerRecord) -> RepoResult<()>;

    /// Returns the record stored under `tid`, if any.
    fn get(&self, tid: &str) -> RepoResult<Option<TaxpayerRecord>>;

    /// Returns every stored record.
    fn list_all(&self) -> RepoResult<Vec<TaxpayerRecord>>;
}

impl<T: TaxpayerStore + ?Sized> TaxpayerStore for Box<T> {
    fn insert(&self, record: &TaxpayerRecord) -> RepoResult<()> {
        (**self).insert(record)
    }

    fn get(&self, tid: &str) -> RepoResult<Option<TaxpayerRecord>> {
        (**self).get(tid)
    }

    fn list_all(&self) -> RepoResult<Vec<TaxpayerRecord>> {
        (**self).list_all()
    }
}
