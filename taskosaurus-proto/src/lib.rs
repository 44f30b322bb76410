//! Shared task model and HTTP wire types for Taskosaurus.

pub mod api;
pub mod filter;
pub mod task;
