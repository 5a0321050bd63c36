use std::fs;

use tempfile::TempDir;

use clippoo_seed::config::synthetic_entries;
use clippoo_seed::db::Database;
use clippoo_seed::{seed, Error, Seeder};

/// End-to-end run against a file on disk: the original 60-entry seed, twice.
#[test]
fn test_seed_on_disk_is_idempotent() {
    let dir = TempDir::new().unwrap();
    // Parent directories are created on demand
    let path = dir.path().join("clippoo").join("clipboard.db");
    let items = synthetic_entries("Test clipboard entry", 60);

    let first = seed(&items, &path).unwrap();
    assert!(path.exists());
    assert_eq!(first.total_count, 60);
    assert_eq!(first.recent.len(), 10);

    let second = seed(&items, &path).unwrap();
    assert_eq!(second.total_count, 60);
    assert_eq!(second.refreshed, 60);

    let db = Database::open(&path).unwrap();
    assert_eq!(db.default_entries().unwrap().len(), 1);
}

#[test]
fn test_existing_rows_count_toward_total() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    {
        let db = Database::open(&path).unwrap();
        db.execute_batch(
            "INSERT INTO clipboard_history (content, is_default) VALUES ('from the daemon', TRUE);",
        )
        .unwrap();
    }

    let report = seed(&synthetic_entries("Test clipboard entry", 5), &path).unwrap();
    assert_eq!(report.total_count, 6);
    assert_eq!(report.inserted, 5);
    assert_eq!(report.recent.len(), 6);
}

#[test]
fn test_missing_unique_constraint_refuses_to_seed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE clipboard_history (
                id         INTEGER PRIMARY KEY,
                content    TEXT,
                is_default BOOLEAN,
                timestamp  DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .unwrap();
    }

    let err = seed(&synthetic_entries("Test clipboard entry", 3), &path).unwrap_err();
    assert!(matches!(err, Error::MissingUniqueConstraint), "{err:?}");

    let db = Database::open(&path).unwrap();
    assert!(!db.has_unique_content_constraint().unwrap());
    assert_eq!(db.count_entries().unwrap(), 0);
}

#[test]
fn test_unique_index_added_later_is_recognized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE clipboard_history (
                id         INTEGER PRIMARY KEY,
                content    TEXT,
                is_default BOOLEAN,
                timestamp  DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE UNIQUE INDEX idx_content ON clipboard_history(content);",
        )
        .unwrap();
    }

    let items = synthetic_entries("Test clipboard entry", 4);
    seed(&items, &path).unwrap();
    let report = seed(&items, &path).unwrap();
    assert_eq!(report.total_count, 4);
    assert_eq!(report.refreshed, 4);
}

#[test]
fn test_garbage_file_is_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    fs::write(&path, "this is not a sqlite database\n".repeat(64)).unwrap();

    let err = seed(&synthetic_entries("Test clipboard entry", 3), &path).unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable { .. }), "{err:?}");
}

#[test]
fn test_uncreatable_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "a file, not a directory").unwrap();
    let path = blocker.join("nested").join("clipboard.db");

    let err = seed(&synthetic_entries("Test clipboard entry", 3), &path).unwrap_err();
    assert!(matches!(err, Error::StoreDirectory { .. }), "{err:?}");
}

#[test]
fn test_locked_store_fails_without_waiting() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    let db = Database::open(&path).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("BEGIN IMMEDIATE").unwrap();

    let err = Seeder::new(&db)
        .seed(&synthetic_entries("Test clipboard entry", 3))
        .unwrap_err();
    assert!(matches!(err, Error::Entry { index: 0, .. }), "{err:?}");

    other.execute_batch("ROLLBACK").unwrap();
    assert_eq!(db.count_entries().unwrap(), 0);
}

#[test]
fn test_null_columns_in_existing_table_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clipboard.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE clipboard_history (
                id         INTEGER PRIMARY KEY,
                content    TEXT UNIQUE,
                is_default BOOLEAN,
                timestamp  DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO clipboard_history (content) VALUES ('legacy');
            INSERT INTO clipboard_history (content, is_default) VALUES (NULL, TRUE);",
        )
        .unwrap();
    }

    let report = seed(&synthetic_entries("Test clipboard entry", 3), &path).unwrap();
    assert_eq!(report.total_count, 5);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.recent.len(), 5);

    let legacy = report.recent.iter().find(|r| r.preview == "legacy").unwrap();
    assert!(!legacy.is_default);
    assert!(report.recent.iter().any(|r| r.preview.is_empty() && r.is_default));

    let db = Database::open(&path).unwrap();
    let legacy = db.get_entry_by_content("legacy").unwrap().unwrap();
    assert!(!legacy.is_default);
    assert_eq!(db.default_entries().unwrap().len(), 2);
}
