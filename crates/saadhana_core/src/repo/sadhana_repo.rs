//! Practice collection repository.
//!
//! # Responsibility
//! - Load the collection as a JSON array under a fixed key (lenient).
//! - Re-serialize and write the full collection on every save.
//!
//! # Invariants
//! - Malformed JSON or a failed read yields an empty collection, logged.
//! - A single undecodable record is skipped, logged; the rest still load.
//! - Loaded incomplete records never carry a reflection.
//! - `save` writes the whole collection; there are no partial updates.

use crate::model::sadhana::Sadhana;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error, warn};
use thiserror::Error;

/// Fixed storage key for the practice collection.
pub const STORAGE_KEY: &str = "saadhanas";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("failed to encode sadhana collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON-array repository for practice records.
pub struct SadhanaRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SadhanaRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Loads the stored collection, falling back to empty on any failure.
    pub fn load(&self) -> Vec<Sadhana> {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=sadhana_load module=repo status=empty key={}", self.key);
                return Vec::new();
            }
            Err(err) => {
                error!(
                    "event=sadhana_load module=repo status=error error_code=store_read_failed key={} error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=sadhana_load module=repo status=error error_code=malformed_json key={} line={} column={}",
                    self.key,
                    err.line(),
                    err.column()
                );
                return Vec::new();
            }
        };

        let total = entries.len();
        let mut records = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Sadhana>(entry) {
                Ok(mut record) => {
                    if !record.completed && record.reflection.take().is_some() {
                        warn!(
                            "event=sadhana_load module=repo status=normalized reason=reflection_without_completion id={}",
                            record.id
                        );
                    }
                    records.push(record);
                }
                Err(err) => warn!(
                    "event=sadhana_load module=repo status=skipped error_code=malformed_record key={} index={} error={}",
                    self.key, index, err
                ),
            }
        }

        debug!(
            "event=sadhana_load module=repo status=ok key={} count={} skipped={}",
            self.key,
            records.len(),
            total - records.len()
        );
        records
    }

    /// Serializes and writes the full collection.
    pub fn save(&mut self, records: &[Sadhana]) -> RepoResult<()> {
        let encoded = serde_json::to_string(records)?;
        self.store.write(&self.key, &encoded)?;
        debug!(
            "event=sadhana_save module=repo status=ok key={} count={} bytes={}",
            self.key,
            records.len(),
            encoded.len()
        );
        Ok(())
    }

    /// Removes the stored collection.
    pub fn clear(&mut self) -> RepoResult<()> {
        self.store.clear(&self.key)?;
        Ok(())
    }
}
