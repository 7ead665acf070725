#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use rusqlite::Connection;
use tempfile::TempDir;

use super::sqlite::init_history_table;
use super::*;

fn temp_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

#[test]
fn init_history_table_is_idempotent() {
    let (dir, _store) = temp_store();
    let conn = Connection::open(dir.path().join(DB_FILE)).unwrap();
    init_history_table(&conn).expect("second init must not error");
}

#[test]
fn append_then_list_preserves_order() {
    let (_dir, store) = temp_store();
    store.append("id1.png", "p1").unwrap();
    store.append("id2.png", "p2||with separator").unwrap();
    let listing = store.list_all().unwrap();
    assert_eq!(
        listing.records,
        vec![
            HistoryRecord::new("id1.png", "p1"),
            HistoryRecord::new("id2.png", "p2||with separator"),
        ]
    );
    assert!(listing.corrupt.is_empty());
    assert_eq!(listing, store.list_all().unwrap());
}

#[test]
fn delete_then_list_removes_row_and_image() {
    let (_dir, store) = temp_store();
    store.append("id1.png", "p1").unwrap();
    store.append("id2.png", "p2").unwrap();
    fs::write(store.image_path("id1.png").unwrap(), b"png").unwrap();

    let outcome = store.delete("id1.png").unwrap();

    assert_eq!(
        outcome,
        DeleteOutcome {
            records_removed: 1,
            image_removed: true
        }
    );
    assert_eq!(
        store.list_all().unwrap().records,
        vec![HistoryRecord::new("id2.png", "p2")]
    );
    assert!(!store.image_path("id1.png").unwrap().exists());
}

#[test]
fn delete_unknown_identifier_is_a_no_op() {
    let (_dir, store) = temp_store();
    store.append("id1.png", "p1").unwrap();
    assert_eq!(store.delete("nope.png").unwrap(), DeleteOutcome::default());
    assert_eq!(store.list_all().unwrap().records.len(), 1);
}

#[test]
fn find_uses_first_matching_row() {
    let (_dir, store) = temp_store();
    store.append("dup.png", "first").unwrap();
    store.append("dup.png", "second").unwrap();
    assert_eq!(
        store.find("dup.png").unwrap(),
        Some(HistoryRecord::new("dup.png", "first"))
    );
    assert_eq!(store.find("missing.png").unwrap(), None);
}

#[test]
fn validation_matches_text_backend() {
    let (_dir, store) = temp_store();
    assert!(matches!(
        store.append("a/b.png", "p"),
        Err(StudioError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.append("ok.png", "a\nb"),
        Err(StudioError::InvalidPayload)
    ));
}

#[test]
fn records_survive_reopen() {
    let (dir, store) = temp_store();
    store.append("id1.png", "p1").unwrap();
    drop(store);
    let reopened = open_store(dir.path(), Backend::Sqlite).unwrap();
    assert_eq!(
        reopened.list_all().unwrap().records,
        vec![HistoryRecord::new("id1.png", "p1")]
    );
}

#[test]
fn check_ignores_database_file() {
    let (_dir, store) = temp_store();
    store.append("ok.png", "p").unwrap();
    fs::write(store.image_path("ok.png").unwrap(), b"png").unwrap();
    assert!(store.check().unwrap().is_consistent());
}
