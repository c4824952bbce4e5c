//! Durable key/value store boundary.
//!
//! # Responsibility
//! - Define the storage port the board persists through.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Values are opaque UTF-8 strings; callers own the encoding.
//! - A failed write leaves the previously stored value intact.

mod memory;
mod sqlite;

use crate::db::DbError;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("write to `{key}` needs {required} bytes but the store quota is {limit}")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-session key/value storage port.
pub trait KeyValueStore {
    /// Reads the value under `key`, `None` when absent.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the value under `key`.
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`; clearing an absent key is a no-op.
    fn clear(&mut self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        (**self).clear(key)
    }
}

fn check_quota(
    key: &str,
    value: &str,
    used_by_others: usize,
    quota: Option<usize>,
) -> StoreResult<()> {
    let Some(limit) = quota else {
        return Ok(());
    };
    let required = used_by_others + key.len() + value.len();
    if required > limit {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            required,
            limit,
        });
    }
    Ok(())
}
