//! In-memory backend: the collection lives only as long as the process.

use parking_lot::Mutex;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId};

use super::collection::TaskCollection;
use super::{BackendError, TaskBackend};

/// Backend that keeps tasks in memory only.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<TaskCollection>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `tasks` (newest first).
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            inner: Mutex::new(TaskCollection::from_tasks(tasks)),
        }
    }
}

impl TaskBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn fetch_all(&self) -> Result<Vec<Task>, BackendError> {
        Ok(self.inner.lock().tasks().to_vec())
    }

    async fn create(&self, text: &str) -> Result<Task, BackendError> {
        self.inner.lock().create(text)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, BackendError> {
        self.inner.lock().update(id, patch)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), BackendError> {
        self.inner.lock().delete(id).map(|_| ())
    }
}
