//! Task client: state container plus synchronization with a backend.
//!
//! Two ways to drive it:
//! - [`TaskClient`] awaits each backend call inline and is what library
//!   users and tests reach for.
//! - The TUI keeps a bare [`TaskList`] and ships its [`SyncCommand`]s to a
//!   [`worker`] so rendering never waits on I/O.
//!
//! Both go through the same request/apply pair on [`TaskList`].

pub mod state;
pub mod sync;
pub mod worker;

pub use state::{Applied, ClearReport, EditState, LoadState, Notice, NoticeLevel, TaskList};
pub use sync::{SyncCommand, SyncEvent};

use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::{Task, TaskId};

use crate::backend::{BackendError, TaskBackend};

/// Errors from client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The id is not in the local collection.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The task already has a request in flight.
    #[error("task {0} is still syncing")]
    Busy(TaskId),

    /// A clear of completed tasks is still running.
    #[error("clear of completed tasks already in progress")]
    ClearInProgress,

    /// The persistence layer failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Task list bound to a backend, with every operation awaited inline.
pub struct TaskClient<B> {
    backend: B,
    state: TaskList,
}

impl<B: TaskBackend> TaskClient<B> {
    /// Creates a client with an empty, idle collection.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: TaskList::new(),
        }
    }

    /// The persistence layer.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Read access to the state container.
    pub const fn state(&self) -> &TaskList {
        &self.state
    }

    /// Mutable access to the state container (editing, notices).
    pub const fn state_mut(&mut self) -> &mut TaskList {
        &mut self.state
    }

    /// Fetches the full collection, replacing the local one.
    ///
    /// On failure the local collection is left empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Backend`] if the fetch failed.
    pub async fn load(&mut self) -> Result<usize, ClientError> {
        let command = self.state.request_load();
        match self.run(command).await? {
            Applied::Loaded(count) => Ok(count),
            other => unreachable_outcome(&other),
        }
    }

    /// Adds a task. Blank text is a no-op and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Backend`] if the layer rejected the task.
    pub async fn add(&mut self, text: &str) -> Result<Option<Task>, ClientError> {
        let Some(command) = self.state.request_add(text) else {
            return Ok(None);
        };
        match self.run(command).await? {
            Applied::Created(task) => Ok(Some(task)),
            other => unreachable_outcome(&other),
        }
    }

    /// Flips `completed` on task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the task is unknown, busy, or the update
    /// failed.
    pub async fn toggle(&mut self, id: &TaskId) -> Result<Task, ClientError> {
        let command = self.state.request_toggle(id)?;
        match self.run(command).await? {
            Applied::Updated(task) => Ok(task),
            other => unreachable_outcome(&other),
        }
    }

    /// Replaces the text of task `id`. Blank text is a no-op and returns
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the task is unknown, busy, or the update
    /// failed.
    pub async fn edit(&mut self, id: &TaskId, text: &str) -> Result<Option<Task>, ClientError> {
        let Some(command) = self.state.request_edit(id, text)? else {
            return Ok(None);
        };
        match self.run(command).await? {
            Applied::Updated(task) => Ok(Some(task)),
            other => unreachable_outcome(&other),
        }
    }

    /// Saves the open edit session, if it holds new non-blank text.
    ///
    /// # Errors
    ///
    /// Same as [`edit`](Self::edit).
    pub async fn commit_edit(&mut self) -> Result<Option<Task>, ClientError> {
        let Some(command) = self.state.commit_edit()? else {
            return Ok(None);
        };
        match self.run(command).await? {
            Applied::Updated(task) => Ok(Some(task)),
            other => unreachable_outcome(&other),
        }
    }

    /// Deletes task `id`. The local entry goes away only once the layer
    /// acknowledged the deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the task is unknown, busy, or the delete
    /// failed.
    pub async fn remove(&mut self, id: &TaskId) -> Result<(), ClientError> {
        let command = self.state.request_remove(id)?;
        self.run(command).await?;
        Ok(())
    }

    /// Deletes every completed task, one request each.
    ///
    /// Failures do not stop the remaining deletions and nothing is rolled
    /// back; the report says how many went through.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ClearInProgress`] if another clear is running.
    pub async fn clear_completed(&mut self) -> Result<ClearReport, ClientError> {
        let commands = self.state.request_clear_completed()?;
        for command in commands {
            if let Some(event) = sync::execute(&self.backend, command).await {
                let _ = self.state.apply(event);
            }
        }
        Ok(self.state.take_clear_report().unwrap_or_default())
    }

    /// Changes the view filter.
    pub const fn set_filter(&mut self, mode: FilterMode) {
        self.state.set_filter(mode);
    }

    /// Tasks matching the current filter, newest first.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.state.visible_tasks()
    }

    async fn run(&mut self, command: SyncCommand) -> Result<Applied, ClientError> {
        match sync::execute(&self.backend, command).await {
            Some(event) => Ok(self.state.apply(event)?),
            None => Err(ClientError::Backend(BackendError::Transport(
                "no answer from persistence layer".to_string(),
            ))),
        }
    }
}

/// Each request kind maps to exactly one [`Applied`] variant.
fn unreachable_outcome<T>(outcome: &Applied) -> Result<T, ClientError> {
    tracing::error!(?outcome, "mismatched sync outcome");
    Err(ClientError::Backend(BackendError::Transport(
        "mismatched sync outcome".to_string(),
    )))
}
