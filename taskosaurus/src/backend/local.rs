//! Local persistent storage backend.
//!
//! The whole collection is stored as a JSON array under a single fixed
//! storage key ([`STORAGE_KEY`]), which maps to
//! `<storage_dir>/taskosaurus.tasks.json`. The document is read lazily on
//! first use (a missing document is an empty collection) and rewritten in
//! full after every change. A write that fails leaves the in-memory copy as
//! it was before the change.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId};

use super::collection::TaskCollection;
use super::{BackendError, TaskBackend};

/// Fixed storage key the collection is saved under.
pub const STORAGE_KEY: &str = "taskosaurus.tasks";

/// Backend that persists the collection to a local JSON document.
pub struct LocalBackend {
    path: PathBuf,
    /// `None` until the document has been read.
    cache: Mutex<Option<TaskCollection>>,
}

impl LocalBackend {
    /// Creates a backend storing its document in `storage_dir`.
    ///
    /// No I/O happens until the first operation.
    #[must_use]
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            path: storage_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
            cache: Mutex::new(None),
        }
    }

    /// Path of the JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored collection, or an empty one if nothing is stored yet.
    async fn read(&self) -> Result<TaskCollection, BackendError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let tasks: Vec<Task> = serde_json::from_slice(&bytes).map_err(|e| {
                    BackendError::Persistence(format!(
                        "corrupt task document {}: {e}",
                        self.path.display()
                    ))
                })?;
                tracing::debug!(path = %self.path.display(), count = tasks.len(), "local tasks read");
                Ok(TaskCollection::from_tasks(tasks))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TaskCollection::default()),
            Err(e) => Err(BackendError::Persistence(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Rewrites the whole document from `collection`.
    async fn write(&self, collection: &TaskCollection) -> Result<(), BackendError> {
        let bytes = serde_json::to_vec_pretty(collection.tasks())
            .map_err(|e| BackendError::Persistence(format!("encode failed: {e}")))?;

        let result = async {
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut tmp = self.path.as_os_str().to_owned();
            tmp.push(".tmp");
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        result.map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "local task write failed");
            BackendError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    /// Runs `change` against the loaded collection and saves the result.
    ///
    /// The cached collection is only replaced once the write succeeded.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut TaskCollection) -> Result<T, BackendError> + Send,
    ) -> Result<T, BackendError> {
        let mut cache = self.cache.lock().await;
        let mut next = match cache.as_ref() {
            Some(collection) => collection.clone(),
            None => self.read().await?,
        };
        let value = change(&mut next)?;
        self.write(&next).await?;
        *cache = Some(next);
        drop(cache);
        Ok(value)
    }
}

impl TaskBackend for LocalBackend {
    fn describe(&self) -> String {
        format!("local ({})", self.path.display())
    }

    async fn fetch_all(&self) -> Result<Vec<Task>, BackendError> {
        let mut cache = self.cache.lock().await;
        let collection = self.read().await?;
        let tasks = collection.tasks().to_vec();
        *cache = Some(collection);
        drop(cache);
        Ok(tasks)
    }

    async fn create(&self, text: &str) -> Result<Task, BackendError> {
        self.mutate(|c| c.create(text)).await
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, BackendError> {
        self.mutate(|c| c.update(id, patch)).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), BackendError> {
        self.mutate(|c| c.delete(id).map(|_| ())).await
    }
}
