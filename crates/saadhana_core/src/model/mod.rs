//! Domain model for practice tracking.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every practice record is identified by a stable `SadhanaId`.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod sadhana;
