use dmconvert_core::db::migrations::{current_user_version, latest_version, reset_schema};
use dmconvert_core::db::{open_db, open_db_in_memory, DbError};
use dmconvert_core::{Collection, GraphStore, SqliteGraphStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_every_collection() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for collection in Collection::ALL {
        assert_table_exists(&conn, collection.table());
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dmconvert.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO users (uri, name, email) VALUES ('urn:u', NULL, 'u@example.org');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&second).unwrap(), latest_version());
    assert_eq!(
        SqliteGraphStore::new(&second)
            .count(Collection::Users)
            .unwrap(),
        1
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn reset_drops_rows_and_restores_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO links (side_a_uri, side_a_kind, side_b_uri, side_b_kind)
         VALUES ('urn:a', 'Document', 'urn:b', 'Document');",
        [],
    )
    .unwrap();
    conn.execute_batch("CREATE TABLE scratch (id INTEGER);").unwrap();

    let store = SqliteGraphStore::new(&conn);
    store.reset().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for collection in Collection::ALL {
        assert_eq!(store.count(collection).unwrap(), 0);
    }
    assert_table_exists(&conn, "scratch");

    reset_schema(&conn).unwrap();
    assert_table_exists(&conn, "links");
}

#[test]
fn invalid_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO projects (uri, document_uris) VALUES ('urn:p', 'not json');",
        [],
    )
    .unwrap();

    let err = SqliteGraphStore::new(&conn).list_projects().unwrap_err();
    assert!(err.to_string().contains("projects.document_uris"));
}

fn assert_table_exists(conn: &Connection, table: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table `{table}` should exist");
}
