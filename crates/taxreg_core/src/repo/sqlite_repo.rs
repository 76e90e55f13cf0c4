//! SQLite-backed taxpayer store.
//!
//! # Responsibility
//! - Persist taxpayer records across process restarts.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Only fully migrated connections are accepted.
//! - Read paths reject persisted rows with empty fields instead of masking them.
//! - Writes are serialized through one writer connection.
//! - File-backed stores read through a pool of read-only WAL connections, so
//!   readers neither block each other nor wait on the writer.

use crate::db::migrations::{current_version, latest_version};
use crate::db::{open_db, open_db_in_memory, open_db_read_only};
use crate::model::taxpayer::TaxpayerRecord;
use crate::repo::taxpayer_repo::{RepoError, RepoResult, TaxpayerStore};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// Read-only connections opened next to the writer for file databases.
pub const READ_POOL_SIZE: usize = 4;

const TAXPAYERS_TABLE: &str = "taxpayers";
const REQUIRED_COLUMNS: &[&str] = &["tid", "first_name", "last_name", "address"];

const TAXPAYER_SELECT_SQL: &str = "SELECT
    tid,
    first_name,
    last_name,
    address
FROM taxpayers";

/// Durable store over a migrated SQLite database.
pub struct SqliteTaxpayerStore {
    write_connection: Mutex<Connection>,
    /// Empty when the store wraps a single connection; reads then share the writer.
    read_connections: Vec<Mutex<Connection>>,
    read_cursor: AtomicUsize,
}

impl SqliteTaxpayerStore {
    /// Wraps an already opened connection after checking its schema.
    ///
    /// Reads and writes share this one connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema was
    ///   tampered with.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        Self::with_readers(conn, Vec::new())
    }

    /// Opens (or creates) the database at `path` with a writer and
    /// [`READ_POOL_SIZE`] read-only connections.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let writer = open_db(path)?;
        let readers = (0..READ_POOL_SIZE)
            .map(|_| open_db_read_only(path))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_readers(writer, readers)
    }

    /// Opens a private in-memory database and wraps it.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Number of dedicated read connections.
    pub fn read_pool_size(&self) -> usize {
        self.read_connections.len()
    }

    fn with_readers(writer: Connection, readers: Vec<Connection>) -> RepoResult<Self> {
        ensure_schema(&writer)?;
        Ok(Self {
            write_connection: Mutex::new(writer),
            read_connections: readers.into_iter().map(Mutex::new).collect(),
            read_cursor: AtomicUsize::new(0),
        })
    }

    // SQLite rolls back any statement interrupted by a panic, so a poisoned
    // guard still wraps a usable connection.
    fn writer(&self) -> MutexGuard<'_, Connection> {
        self.write_connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Picks an idle reader starting at the round-robin cursor, waiting only
    /// when every reader is busy.
    fn reader(&self) -> MutexGuard<'_, Connection> {
        let len = self.read_connections.len();
        if len == 0 {
            return self.writer();
        }

        let start = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        for offset in 0..len {
            match self.read_connections[(start + offset) % len].try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            }
        }
        self.read_connections[start]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaxpayerStore for SqliteTaxpayerStore {
    fn insert(&self, record: &TaxpayerRecord) -> RepoResult<()> {
        let changed = self.writer().execute(
            "INSERT INTO taxpayers (
                tid,
                first_name,
                last_name,
                address
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tid) DO NOTHING;",
            params![
                record.tid.as_str(),
                record.first_name.as_str(),
                record.last_name.as_str(),
                record.address.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::DuplicateKey(record.tid.clone()));
        }
        Ok(())
    }

    fn get(&self, tid: &str) -> RepoResult<Option<TaxpayerRecord>> {
        let conn = self.reader();
        let mut stmt = conn.prepare(&format!("{TAXPAYER_SELECT_SQL} WHERE tid = ?1;"))?;
        let mut rows = stmt.query([tid])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_taxpayer_row(row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<TaxpayerRecord>> {
        let conn = self.reader();
        let mut stmt = conn.prepare(&format!("{TAXPAYER_SELECT_SQL} ORDER BY tid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_taxpayer_row(row)?);
        }
        Ok(records)
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [TAXPAYERS_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(TAXPAYERS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([TAXPAYERS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name.as_str() == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: TAXPAYERS_TABLE,
                column,
            });
        }
    }
    Ok(())
}

fn parse_taxpayer_row(row: &Row<'_>) -> RepoResult<TaxpayerRecord> {
    let record = TaxpayerRecord {
        tid: row.get("tid")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        address: row.get("address")?,
    };
    record.validate().map_err(|err| {
        RepoError::InvalidData(format!("row `{}` in taxpayers: {err}", record.tid))
    })?;
    Ok(record)
}
