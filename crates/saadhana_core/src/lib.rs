//! Core domain logic for Saadhana Board.
//! This crate is the single source of truth for practice-tracking invariants.

pub mod board;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use board::classify::{
    classify, group_sadhanas, matches_filter, Bucket, BucketCounts, GroupedSadhanas,
    PriorityFilter,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::sadhana::{
    parse_due_date, Category, ParseLabelError, Priority, Sadhana, SadhanaDraft, SadhanaId,
    SadhanaValidationError,
};
pub use repo::sadhana_repo::{RepoError, RepoResult, SadhanaRepository, STORAGE_KEY};
pub use service::board_service::{BoardError, SadhanaBoard, ToggleOutcome};
pub use store::{KeyValueStore, MemoryStore, SqliteKvStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
