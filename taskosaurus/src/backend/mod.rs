//! Persistence layers the task client can synchronize with.
//!
//! Defines the [`TaskBackend`] trait plus three implementations:
//! - [`MemoryBackend`]: nothing survives the process
//! - [`LocalBackend`]: the whole collection as one JSON document on disk
//! - [`RemoteBackend`]: the Taskosaurus HTTP store
//!
//! Every backend returns *canonical* records: the client replaces its local
//! entry with whatever the backend hands back and never keeps its own guess
//! of an id or timestamp.

pub mod collection;
pub mod local;
pub mod memory;
pub mod remote;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

use std::future::Future;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId};

/// Errors reported by a persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The layer rejected the submitted data.
    #[error("{0}")]
    Validation(String),

    /// No task has the given id.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The layer could not be reached or answered with something unreadable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server reported an unexpected failure.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error body.
        message: String,
    },

    /// Local storage could not be read or written.
    #[error("storage error: {0}")]
    Persistence(String),
}

/// A persistence layer with per-task create/update/delete.
///
/// Collection-oriented layers (memory, local document) implement the
/// per-task calls by mutating their own copy and rewriting it in full.
pub trait TaskBackend: Send + Sync + 'static {
    /// Short human-readable description shown in the status bar.
    fn describe(&self) -> String;

    /// Fetch the full collection, newest first.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Task>, BackendError>> + Send;

    /// Create a task from `text` and return the canonical record.
    fn create(&self, text: &str) -> impl Future<Output = Result<Task, BackendError>> + Send;

    /// Apply `patch` to task `id` and return the canonical record.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task, BackendError>> + Send;

    /// Delete task `id`.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Backend chosen at runtime from configuration.
pub enum Backend {
    /// In-memory only.
    Memory(MemoryBackend),
    /// JSON document on local disk.
    Local(LocalBackend),
    /// HTTP task store.
    Remote(RemoteBackend),
}

impl TaskBackend for Backend {
    fn describe(&self) -> String {
        match self {
            Self::Memory(b) => b.describe(),
            Self::Local(b) => b.describe(),
            Self::Remote(b) => b.describe(),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Task>, BackendError> {
        match self {
            Self::Memory(b) => b.fetch_all().await,
            Self::Local(b) => b.fetch_all().await,
            Self::Remote(b) => b.fetch_all().await,
        }
    }

    async fn create(&self, text: &str) -> Result<Task, BackendError> {
        match self {
            Self::Memory(b) => b.create(text).await,
            Self::Local(b) => b.create(text).await,
            Self::Remote(b) => b.create(text).await,
        }
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, BackendError> {
        match self {
            Self::Memory(b) => b.update(id, patch).await,
            Self::Local(b) => b.update(id, patch).await,
            Self::Remote(b) => b.update(id, patch).await,
        }
    }

    async fn delete(&self, id: &TaskId) -> Result<(), BackendError> {
        match self {
            Self::Memory(b) => b.delete(id).await,
            Self::Local(b) => b.delete(id).await,
            Self::Remote(b) => b.delete(id).await,
        }
    }
}
