use catalog_core::db::migrations::{current_version, latest_version};
use catalog_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory database should open");

    assert_eq!(current_version(&conn).expect("read user_version"), latest_version());
    assert_table_exists(&conn, "records");
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("catalog.sqlite3");

    let conn = open_db(&path).expect("file database should open");
    conn.execute(
        "INSERT INTO records (numeric_fields, string_fields) VALUES ('{}', '{\"name\":\"A\"}');",
        [],
    )
    .expect("insert seed row");
    drop(conn);

    let reopened = open_db(&path).expect("reopen keeps schema");
    assert_eq!(current_version(&reopened).expect("read user_version"), latest_version());
    let rows: i64 = reopened
        .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get(0))
        .expect("count rows");
    assert_eq!(rows, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).expect("raw sqlite open");
    conn.execute_batch("PRAGMA user_version = 999;").expect("bump user_version");
    drop(conn);

    match open_db(&path).expect_err("newer schema must be refused") {
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

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("query sqlite_master");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
