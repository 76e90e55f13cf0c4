use taxreg_core::db::migrations::latest_version;
use taxreg_core::db::{open_db, open_db_in_memory, open_db_read_only, DbError, OpenTarget};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "taxpayers");
}

#[test]
fn reopening_file_database_keeps_schema_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO taxpayers (tid, first_name, last_name, address) VALUES ('T1', 'Ana', 'Lee', '12 Oak St');",
        [],
    )
    .unwrap();
    drop(conn);

    let reopened = open_db(&path).unwrap();
    assert_eq!(schema_version(&reopened), latest_version());
    let count: i64 = reopened
        .query_row("SELECT COUNT(*) FROM taxpayers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn tid_is_primary_key_in_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO taxpayers (tid, first_name, last_name, address) VALUES ('T1', 'a', 'b', 'c');",
        [],
    )
    .unwrap();

    let second = conn.execute(
        "INSERT INTO taxpayers (tid, first_name, last_name, address) VALUES ('T1', 'x', 'y', 'z');",
        [],
    );
    assert!(second.is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_schema_too_new");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn taxpayers_table_has_exactly_the_record_columns() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('taxpayers') ORDER BY cid;")
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, ["tid", "first_name", "last_name", "address"]);
}

#[test]
fn file_databases_use_wal_journal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    drop(open_db(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode, "wal");
}

#[test]
fn open_failure_names_the_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("registry.db");

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_open_failed");
    match &err {
        DbError::Open { target, .. } => assert_eq!(target, &OpenTarget::File(path.clone())),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("missing-dir"));
}

#[test]
fn read_only_open_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-created.db");

    let err = open_db_read_only(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::Open {
            target: OpenTarget::ReadOnly(_),
            ..
        }
    ));
    assert!(!path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
