//! SQLite key-value table
//!
//! Schema:
//! - kv table: key (primary), value (JSON text), updated_at (RFC 3339)
//!
//! File databases run in WAL mode so a reader in another process does not
//! block a writer. Writes are still last-writer-wins.

use super::KvBackend;
use crate::error::{CoreError, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Storage in a single SQLite table (thread-safe)
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Create or open `<dir>/usagegate.db`
    pub fn open_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| CoreError::FileWrite {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open(&dir.join("usagegate.db"))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(CoreError::sqlite("open"))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(CoreError::sqlite("enable WAL"))?;
        debug!(path = %path.display(), "Opened SQLite store");
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(CoreError::sqlite("open"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(CoreError::sqlite("create schema"))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KvBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(CoreError::sqlite("read"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(CoreError::sqlite("write"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(CoreError::sqlite("delete"))?;
        Ok(())
    }
}
