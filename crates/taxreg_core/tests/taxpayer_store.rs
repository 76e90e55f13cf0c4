use rusqlite::Connection;
use std::collections::HashSet;
use taxreg_core::db::migrations::latest_version;
use taxreg_core::db::open_db;
use taxreg_core::{
    InMemoryTaxpayerStore, RepoError, SqliteTaxpayerStore, TaxpayerRecord, TaxpayerStore,
};

fn backends() -> Vec<(&'static str, Box<dyn TaxpayerStore>)> {
    let memory: Box<dyn TaxpayerStore> = Box::new(InMemoryTaxpayerStore::new());
    let sqlite: Box<dyn TaxpayerStore> = Box::new(SqliteTaxpayerStore::open_in_memory().unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}

fn record(tid: &str) -> TaxpayerRecord {
    TaxpayerRecord::new(tid, "Ana", "Lee", "12 Oak St")
}

#[test]
fn insert_then_get_returns_identical_record() {
    for (name, store) in backends() {
        let expected = record("T1");
        store.insert(&expected).unwrap();
        assert_eq!(store.get("T1").unwrap(), Some(expected), "backend {name}");
    }
}

#[test]
fn get_missing_key_is_none_not_error() {
    for (name, store) in backends() {
        assert!(store.get("nope").unwrap().is_none(), "backend {name}");
    }
}

#[test]
fn duplicate_insert_fails_and_keeps_original_fields() {
    for (name, store) in backends() {
        store.insert(&record("T1")).unwrap();

        let err = store
            .insert(&TaxpayerRecord::new("T1", "X", "Y", "Z"))
            .unwrap_err();
        assert!(
            matches!(err, RepoError::DuplicateKey(ref tid) if tid == "T1"),
            "backend {name}: {err}"
        );

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![record("T1")], "backend {name}");
    }
}

#[test]
fn list_all_returns_every_record_once() {
    for (name, store) in backends() {
        for tid in ["T2", "T1", "T3"] {
            store.insert(&record(tid)).unwrap();
        }
        let tids: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|record| record.tid)
            .collect();
        let unique: HashSet<_> = tids.iter().collect();
        assert_eq!(tids.len(), 3, "backend {name}");
        assert_eq!(unique.len(), 3, "backend {name}");
    }
}

#[test]
fn keys_are_case_sensitive() {
    for (name, store) in backends() {
        store.insert(&record("ab1")).unwrap();
        store.insert(&record("AB1")).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2, "backend {name}");
    }
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let store = SqliteTaxpayerStore::open(&path).unwrap();
    store.insert(&record("T1")).unwrap();
    drop(store);

    let reopened = SqliteTaxpayerStore::open(&path).unwrap();
    assert_eq!(reopened.get("T1").unwrap(), Some(record("T1")));
    let err = reopened.insert(&record("T1")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(_)));
}

#[test]
fn sqlite_store_rejects_persisted_row_with_empty_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO taxpayers (tid, first_name, last_name, address) VALUES ('T9', 'Ana', '', 'x');",
        [],
    )
    .unwrap();
    drop(conn);

    let store = SqliteTaxpayerStore::open(&path).unwrap();
    assert!(matches!(store.get("T9"), Err(RepoError::InvalidData(_))));
    assert!(matches!(store.list_all(), Err(RepoError::InvalidData(_))));
}

#[test]
fn sqlite_store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaxpayerStore::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn sqlite_store_rejects_connection_without_taxpayers_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTaxpayerStore::try_new(conn),
        Err(RepoError::MissingRequiredTable("taxpayers"))
    ));
}

#[test]
fn sqlite_store_rejects_table_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE taxpayers (
            tid TEXT PRIMARY KEY NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTaxpayerStore::try_new(conn),
        Err(RepoError::MissingRequiredColumn {
            table: "taxpayers",
            column: "address"
        })
    ));
}
