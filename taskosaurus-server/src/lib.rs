//! Taskosaurus task server library.
//!
//! Exposes the HTTP task store for use in tests and embedding. The server
//! owns the authoritative task collection, validates and timestamps writes,
//! and optionally persists the collection to a JSON document file.

pub mod api;
pub mod config;
pub mod store;
