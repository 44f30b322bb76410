//! JSON bodies exchanged over the Taskosaurus HTTP API.
//!
//! | Method | Path          | Request            | Success            |
//! |--------|---------------|--------------------|--------------------|
//! | GET    | `/tasks`      | -                  | `200` `[Task]`     |
//! | POST   | `/tasks`      | [`CreateTask`]     | `201` `Task`       |
//! | PUT    | `/tasks/{id}` | [`TaskPatch`]      | `200` `Task`       |
//! | DELETE | `/tasks/{id}` | -                  | `200` [`DeleteAck`]|
//! | GET    | `/`           | -                  | `200` plain text   |
//!
//! Every failure carries an [`ErrorBody`].

use serde::{Deserialize, Serialize};

/// Path of the task collection resource.
pub const TASKS_PATH: &str = "/tasks";

/// Plain-text body returned by the liveness route.
pub const LIVENESS_TEXT: &str = "🦖 Taskosaurus API is roaring!";

/// Acknowledgement text returned after a successful delete.
pub const DELETED_MESSAGE: &str = "Task deleted successfully";

/// Error text for unknown task ids.
pub const NOT_FOUND_MESSAGE: &str = "Task not found";

/// Body of `POST /tasks`.
///
/// `text` is optional on the wire so that a missing field is reported as a
/// validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    /// Text of the new task.
    #[serde(default)]
    pub text: Option<String>,
}

impl CreateTask {
    /// Creates a request body carrying `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Body of `PUT /tasks/{id}`: only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// Patch that only replaces the text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

/// Body returned by `DELETE /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    /// Human-readable confirmation.
    pub message: String,
}

impl Default for DeleteAck {
    fn default() -> Self {
        Self {
            message: DELETED_MESSAGE.to_string(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub message: String,
}

impl ErrorBody {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
