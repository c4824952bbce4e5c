//! Board view derivation.
//!
//! # Responsibility
//! - Turn a flat practice list into the five ordered display buckets.
//!
//! # Invariants
//! - Pure computation; no store access happens here.

pub mod classify;
