//! Unit tests for the deckvault database layer: schema shape and the
//! transaction wrapper.

use rusqlite::Connection;

use deckvault::database::{with_transaction, ConnectionManager};
use deckvault::types::errors::DatabaseError;

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
        [kind, name],
        |row| row.get(0),
    )
    .unwrap_or(false)
}

#[test]
fn test_open_in_memory_succeeds() {
    let db = ConnectionManager::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
    assert!(db.unwrap().is_connected());
}

#[test]
fn test_migrations_create_all_tables() {
    let mut db = ConnectionManager::open_in_memory().expect("open_in_memory failed");
    let conn = db.ensure_connection().expect("connection");

    for table in [
        "schema_migrations",
        "decks",
        "wishlist",
        "market_values",
        "shared_collections",
    ] {
        assert!(object_exists(conn, "table", table), "Table '{}' should exist", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let mut db = ConnectionManager::open_in_memory().expect("open_in_memory failed");
    let conn = db.ensure_connection().expect("connection");

    for index in [
        "idx_market_values_updated_at",
        "idx_decks_created_at",
        "idx_decks_manufacturer",
        "idx_shared_collections_expires_at",
    ] {
        assert!(object_exists(conn, "index", index), "Index '{}' should exist", index);
    }
}

#[test]
fn test_foreign_keys_enabled() {
    let mut db = ConnectionManager::open_in_memory().expect("open_in_memory failed");
    let conn = db.ensure_connection().expect("connection");
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn test_open_path_creates_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("collection.db");
    assert!(!path.exists());

    let mut db = ConnectionManager::open_path(&path).expect("open_path failed");
    assert!(path.exists());
    assert_eq!(db.schema_version().unwrap(), 5);
}

#[test]
fn test_with_transaction_commits_on_success() {
    let mut db = ConnectionManager::open_in_memory().unwrap();
    let conn = db.ensure_connection().unwrap();

    let id = with_transaction(conn, "insert", |tx| {
        tx.execute(
            "INSERT INTO wishlist (deck_name, manufacturer, priority, created_at) VALUES ('Tally-Ho', 'USPCC', 3, 0)",
            [],
        )?;
        Ok(tx.last_insert_rowid())
    })
    .unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM wishlist WHERE id = ?1", [id], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_with_transaction_rolls_back_on_error() {
    let mut db = ConnectionManager::open_in_memory().unwrap();
    let conn = db.ensure_connection().unwrap();

    let result: Result<(), DatabaseError> = with_transaction(conn, "insert", |tx| {
        tx.execute(
            "INSERT INTO wishlist (deck_name, manufacturer, priority, created_at) VALUES ('Tally-Ho', 'USPCC', 3, 0)",
            [],
        )?;
        Err(DatabaseError::InvalidInput("abort".to_string()))
    });
    assert!(result.is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM wishlist", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "the insert should have been rolled back");
}

#[test]
fn test_constraint_violation_rolls_back_whole_transaction() {
    let mut db = ConnectionManager::open_in_memory().unwrap();
    let conn = db.ensure_connection().unwrap();

    let result = with_transaction(conn, "two inserts", |tx| {
        tx.execute(
            "INSERT INTO wishlist (deck_name, manufacturer, priority, created_at) VALUES ('A', 'B', 3, 0)",
            [],
        )?;
        // priority out of range trips the CHECK constraint
        tx.execute(
            "INSERT INTO wishlist (deck_name, manufacturer, priority, created_at) VALUES ('C', 'D', 9, 0)",
            [],
        )?;
        Ok(())
    });
    assert!(matches!(result, Err(DatabaseError::Query(_))));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM wishlist", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
