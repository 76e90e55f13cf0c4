//! Connection bootstrap for the registry database.
//!
//! # Invariants
//! - Every returned connection has a busy timeout.
//! - Writable connections have `foreign_keys=ON` and migrations fully applied.
//! - Read-only connections refuse writes (`query_only`).

use super::migrations::{apply_migrations, current_version, latest_version};
use super::{DbError, DbResult, OpenTarget};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a registry database file, switches it to WAL and migrates it.
///
/// Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(
        OpenTarget::File(path.to_path_buf()),
        |conn| {
            bootstrap_writer(conn)?;
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| {
                row.get::<_, String>(0)
            })?;
            conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
            Ok(())
        },
        || Connection::open(path),
    )
}

/// Opens an extra read-only connection to an already migrated database file.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this binary.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(
        OpenTarget::ReadOnly(path.to_path_buf()),
        |conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA query_only = ON;")?;
            let db_version = current_version(conn)?;
            let latest_supported = latest_version();
            if db_version > latest_supported {
                return Err(DbError::UnsupportedSchemaVersion {
                    db_version,
                    latest_supported,
                });
            }
            Ok(())
        },
        || {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
        },
    )
}

/// Opens a private in-memory registry database and migrates it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(OpenTarget::Memory, bootstrap_writer, Connection::open_in_memory)
}

fn open_with(
    target: OpenTarget,
    bootstrap: impl FnOnce(&mut Connection) -> DbResult<()>,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let result = match connect() {
        Ok(mut conn) => bootstrap(&mut conn).map(|()| conn),
        Err(source) => Err(DbError::Open { target, source }),
    };

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}

fn bootstrap_writer(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
