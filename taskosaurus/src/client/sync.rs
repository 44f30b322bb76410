//! Commands sent to a persistence layer and the events it answers with.
//!
//! [`SyncCommand`]s are produced by [`TaskList`](super::TaskList) request
//! methods; [`execute`] runs one against a [`TaskBackend`] and yields the
//! matching [`SyncEvent`], which is folded back with
//! [`TaskList::apply`](super::TaskList::apply).

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId};

use crate::backend::{BackendError, TaskBackend};

/// A request for the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the full collection.
    Load,
    /// Create a task from already-trimmed text.
    Create {
        /// Text of the new task.
        text: String,
    },
    /// Apply a partial update.
    Update {
        /// Target task.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
    },
    /// Delete a task.
    Delete {
        /// Target task.
        id: TaskId,
        /// Bulk-clear batch this deletion belongs to, if any.
        batch: Option<u64>,
    },
    /// Stop the sync worker.
    Shutdown,
}

/// The persistence layer's answer to a [`SyncCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Answer to [`SyncCommand::Load`].
    Loaded(Result<Vec<Task>, BackendError>),
    /// Answer to [`SyncCommand::Create`].
    Created {
        /// Text that was submitted (handed back to the input on failure).
        text: String,
        /// Canonical record or failure.
        result: Result<Task, BackendError>,
    },
    /// Answer to [`SyncCommand::Update`].
    Updated {
        /// Target task.
        id: TaskId,
        /// Canonical record or failure.
        result: Result<Task, BackendError>,
    },
    /// Answer to [`SyncCommand::Delete`].
    Deleted {
        /// Target task.
        id: TaskId,
        /// Bulk-clear batch, if any.
        batch: Option<u64>,
        /// Acknowledgement or failure.
        result: Result<(), BackendError>,
    },
}

impl SyncCommand {
    /// The event reporting `err` as this command's outcome, or `None` for
    /// [`SyncCommand::Shutdown`].
    #[must_use]
    pub fn fail(self, err: BackendError) -> Option<SyncEvent> {
        Some(match self {
            Self::Load => SyncEvent::Loaded(Err(err)),
            Self::Create { text } => SyncEvent::Created {
                text,
                result: Err(err),
            },
            Self::Update { id, .. } => SyncEvent::Updated {
                id,
                result: Err(err),
            },
            Self::Delete { id, batch } => SyncEvent::Deleted {
                id,
                batch,
                result: Err(err),
            },
            Self::Shutdown => return None,
        })
    }
}

/// Runs `command` against `backend`.
///
/// Returns `None` for [`SyncCommand::Shutdown`], which has no answer.
pub async fn execute<B: TaskBackend>(backend: &B, command: SyncCommand) -> Option<SyncEvent> {
    let event = match command {
        SyncCommand::Load => SyncEvent::Loaded(backend.fetch_all().await),
        SyncCommand::Create { text } => {
            let result = backend.create(&text).await;
            SyncEvent::Created { text, result }
        }
        SyncCommand::Update { id, patch } => {
            let result = backend.update(&id, &patch).await;
            SyncEvent::Updated { id, result }
        }
        SyncCommand::Delete { id, batch } => {
            let result = backend.delete(&id).await;
            SyncEvent::Deleted { id, batch, result }
        }
        SyncCommand::Shutdown => return None,
    };
    Some(event)
}
