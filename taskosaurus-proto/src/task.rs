//! Task model shared by the Taskosaurus store and client.
//!
//! A [`Task`] is the only entity in the system. Its `id` and `created_at`
//! are assigned by whichever persistence layer creates it and never change
//! afterwards; `text` and `completed` are the only mutable fields.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier for a task.
///
/// The HTTP store assigns UUID v7 strings; local persistence layers assign
/// wall-clock milliseconds. Clients must treat the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Creates a task identifier from a millisecond timestamp.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned at creation.
    pub id: TaskId,
    /// User-supplied text, stored trimmed and never empty.
    pub text: String,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Creation time assigned by the persistence layer.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a fresh, not yet completed task.
    #[must_use]
    pub const fn new(id: TaskId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
        }
    }
}

/// Error returned when task text fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Text was missing, empty, or whitespace only.
    #[error("Text is required")]
    TextRequired,
}

/// Trims `text` and rejects it if nothing is left.
///
/// # Errors
///
/// Returns [`ValidationError::TextRequired`] for empty or whitespace-only
/// input.
pub fn normalize_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TextRequired);
    }
    Ok(trimmed.to_string())
}

/// Sorts tasks newest first by `created_at`, breaking ties by descending id.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| Reverse((t.created_at, t.id.clone())));
}
