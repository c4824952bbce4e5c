//! Bridge crate exposing `saadhana_core` use-cases to the UI shell.

pub mod api;
