//! Taskosaurus: a minimal to-do list client.
//!
//! The [`client`] module owns the task state and its synchronization with a
//! [`backend`]; [`app`] and [`ui`] put a terminal front end on top.

pub mod app;
pub mod backend;
pub mod client;
pub mod config;
pub mod ui;
