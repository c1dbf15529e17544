use feedbook_core::db::migrations::latest_version;
use feedbook_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "entries");
    assert_table_exists(&conn, "entry_tags");
    assert_table_exists(&conn, "book_state");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn book_column_only_accepts_known_books() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO entries (book, position, title, description, link, is_read)
         VALUES ('trash', 0, 'Title', '', 'http://a.com', 0);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn deleting_an_entry_cascades_to_its_tags() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO entries (book, position, title, description, link, is_read)
         VALUES ('active', 0, 'Title', '', 'http://a.com', 0);
         INSERT INTO entry_tags (book, link, tag) VALUES ('active', 'http://a.com', 'rust');
         DELETE FROM entries;",
    )
    .unwrap();

    let tags: i64 = conn
        .query_row("SELECT COUNT(*) FROM entry_tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tags, 0);
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
    assert_eq!(exists, 1, "missing table {table_name}");
}
