//! SQLite-backed key/value store over the `kv_entries` table.

use super::{check_quota, KeyValueStore, StoreResult};
use crate::db::DbResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Key/value store owning a migrated SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
    quota_bytes: Option<usize>,
}

impl SqliteKvStore {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            quota_bytes: None,
        }
    }

    /// Opens (and migrates) a database file and wraps it.
    pub fn open(path: impl AsRef<std::path::Path>) -> DbResult<Self> {
        Ok(Self::new(crate::db::open_db(path)?))
    }

    /// Opens (and migrates) an in-memory database and wraps it.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(crate::db::open_db_in_memory()?))
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn used_bytes_excluding(&self, key: &str) -> StoreResult<usize> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_entries
             WHERE key != ?1;",
            [key],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(usize::MAX))
    }
}

impl KeyValueStore for SqliteKvStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if self.quota_bytes.is_some() {
            let used = self.used_bytes_excluding(key)?;
            check_quota(key, value, used, self.quota_bytes)?;
        }

        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
