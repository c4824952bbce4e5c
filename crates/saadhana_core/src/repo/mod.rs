//! Repository layer over the key/value store port.
//!
//! # Responsibility
//! - Encode/decode the practice collection to the stored JSON shape.
//! - Keep store details out of the board service.
//!
//! # Invariants
//! - The whole collection lives under one fixed key.
//! - Reads degrade to an empty collection; they never fail the caller.

pub mod sadhana_repo;
