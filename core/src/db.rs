use std::path::Path;
use std::time::Duration;

use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;

use crate::error::{Error, Result};

/// Current UTC time with millisecond precision. Text in this shape sorts
/// correctly against second-precision `CURRENT_TIMESTAMP` values.
const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

// ---------------------------------------------------------------------------
// Data structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ClipboardEntry {
    pub id: i64,
    pub content: String,
    pub is_default: bool,
    pub timestamp: String,
}

/// Result of a plain insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// A row with the same content already exists; nothing was written.
    Duplicate,
}

/// Result of an insert-or-refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i64),
    Refreshed,
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Callers select NULL-able columns through COALESCE; tables created by
/// other tools may allow NULL in any of them.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClipboardEntry> {
    Ok(ClipboardEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        is_default: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the clipboard store at `path` and create the schema
    /// if it is missing. Any failure here means nothing was written.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::StoreDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let unavailable = |source| Error::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(unavailable)?;
        let db = Self { conn };
        db.apply_pragmas().map_err(unavailable)?;
        db.migrate().map_err(unavailable)?;
        Ok(db)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_pragmas()?;
        db.migrate()?;
        Ok(db)
    }

    /// rusqlite waits up to 5s on a locked database by default. A lock
    /// conflict must fail the run instead, so the wait starts at zero.
    fn apply_pragmas(&self) -> rusqlite::Result<()> {
        self.conn.busy_timeout(Duration::ZERO)
    }

    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Execute `f` inside an IMMEDIATE transaction. Commits on Ok, rolls back on Err.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f() {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Same table and indexes the clippoo daemon creates, so either side may
    /// create the file first.
    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS clipboard_history (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                content    TEXT NOT NULL UNIQUE,
                timestamp  DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                is_default BOOLEAN NOT NULL DEFAULT FALSE
            );

            CREATE INDEX IF NOT EXISTS idx_timestamp ON clipboard_history(timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_default   ON clipboard_history(is_default);
            ",
        )
    }

    /// True when some non-partial unique index covers exactly `content`.
    /// A pre-existing table created without one makes duplicate detection
    /// impossible.
    pub fn has_unique_content_constraint(&self) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM pragma_index_list('clipboard_history')
             WHERE \"unique\" = 1 AND partial = 0",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut cols_stmt = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        for name in names {
            let cols = cols_stmt
                .query_map(params![name], |row| row.get::<_, Option<String>>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if cols.len() == 1 && cols[0].as_deref() == Some("content") {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new row. A unique-constraint violation on `content` is
    /// reported as `Duplicate`; every other failure is an error.
    pub fn insert_entry(&self, content: &str, is_default: bool) -> Result<InsertOutcome> {
        let res = self.conn.execute(
            &format!(
                "INSERT INTO clipboard_history (content, is_default, timestamp)
                 VALUES (?1, ?2, {NOW})"
            ),
            params![content, is_default],
        );
        match res {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    /// Refresh the timestamp of the row holding `content`.
    /// Returns true if a row was updated.
    pub fn touch_entry(&self, content: &str) -> Result<bool> {
        let n = self.conn.execute(
            &format!("UPDATE clipboard_history SET timestamp = {NOW} WHERE content = ?1"),
            params![content],
        )?;
        Ok(n > 0)
    }

    /// Insert a new row, or refresh the timestamp of the existing row with the
    /// same content, in one statement. `is_default` is only applied on insert.
    pub fn upsert_entry(&self, content: &str, is_default: bool) -> Result<UpsertOutcome> {
        // ON CONFLICT UPDATE leaves last_insert_rowid untouched, and
        // AUTOINCREMENT never hands out an old id again, so a changed rowid
        // means the insert path ran.
        let before = self.conn.last_insert_rowid();
        self.conn.execute(
            &format!(
                "INSERT INTO clipboard_history (content, is_default, timestamp)
                 VALUES (?1, ?2, {NOW})
                 ON CONFLICT(content) DO UPDATE SET timestamp = excluded.timestamp"
            ),
            params![content, is_default],
        )?;
        let after = self.conn.last_insert_rowid();
        if after != before {
            Ok(UpsertOutcome::Inserted(after))
        } else {
            Ok(UpsertOutcome::Refreshed)
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn count_entries(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM clipboard_history", [], |r| r.get(0))?;
        Ok(count)
    }

    /// Most recently touched rows first. Ties on timestamp go to the higher id.
    /// Timestamps come back normalized to `YYYY-MM-DD HH:MM:SS`.
    pub fn recent_entries(&self, limit: usize) -> Result<Vec<ClipboardEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, COALESCE(content, ''), COALESCE(is_default, FALSE),
                    COALESCE(datetime(timestamp), '')
             FROM clipboard_history
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_entry)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn get_entry_by_content(&self, content: &str) -> Result<Option<ClipboardEntry>> {
        let r = self
            .conn
            .query_row(
                "SELECT id, COALESCE(content, ''), COALESCE(is_default, FALSE),
                        COALESCE(timestamp, '')
                 FROM clipboard_history WHERE content = ?1",
                params![content],
                row_to_entry,
            )
            .optional()?;
        Ok(r)
    }

    pub fn default_entries(&self) -> Result<Vec<ClipboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, COALESCE(content, ''), COALESCE(is_default, FALSE),
                    COALESCE(timestamp, '')
             FROM clipboard_history WHERE is_default = TRUE
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Run raw SQL against the store (test fixtures, diagnostics).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Return all user table names (for testing/diagnostics).
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table'
             AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}
