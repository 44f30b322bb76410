//! Shared bookkeeping for backends that own the whole collection.
//!
//! [`TaskCollection`] applies create/update/delete to a newest-first list and
//! assigns ids from the wall clock in milliseconds. Two tasks created within
//! the same millisecond get consecutive ids, so ids stay unique and
//! increasing.

use chrono::Utc;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId, normalize_text};

use super::BackendError;

/// A newest-first task list with local id assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    last_id: u64,
}

impl TaskCollection {
    /// Wraps an existing newest-first list.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let last_id = tasks
            .iter()
            .filter_map(|t| t.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { tasks, last_id }
    }

    /// The tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Creates a task at the head of the list.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] for blank text.
    pub fn create(&mut self, text: &str) -> Result<Task, BackendError> {
        let text = normalize_text(text).map_err(|e| BackendError::Validation(e.to_string()))?;
        let now = Utc::now();
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last_id = millis.max(self.last_id + 1);

        let task = Task::new(TaskId::from_millis(self.last_id), text, now);
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Applies the fields present in `patch` to task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown id, or
    /// [`BackendError::Validation`] if the patch carries blank text.
    pub fn update(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<Task, BackendError> {
        let text = patch
            .text
            .as_deref()
            .map(normalize_text)
            .transpose()
            .map_err(|e| BackendError::Validation(e.to_string()))?;

        let task = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        Ok(task.clone())
    }

    /// Removes task `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &TaskId) -> Result<Task, BackendError> {
        let index = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;
        Ok(self.tasks.remove(index))
    }
}
