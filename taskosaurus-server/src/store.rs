//! Authoritative task collection with optional JSON snapshot persistence.
//!
//! The [`TaskStore`] holds every task in a map keyed by [`TaskId`]. When
//! opened with a snapshot path, the full collection is rewritten to that
//! file after each mutation (temp file + rename) while the write lock is
//! held, so the file always matches a state the API has confirmed. If the
//! snapshot write fails the in-memory change is undone and the caller gets
//! [`StoreError::Persistence`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::RwLock;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::task::{Task, TaskId, ValidationError, normalize_text, sort_newest_first};

/// Errors produced by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Submitted text was blank.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No task has the given id.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The snapshot file could not be read or written.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// The server's task collection.
///
/// Thread-safe via [`RwLock`]. Every mutation targets exactly one task and
/// holds the write lock until the change (and its snapshot) is complete.
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    snapshot: Option<PathBuf>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TaskStore {
    /// Creates an empty store that keeps tasks in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            snapshot: None,
        }
    }

    /// Opens a store persisted to the JSON document at `path`.
    ///
    /// A missing file starts an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the file exists but cannot be
    /// read or does not contain a JSON array of tasks.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tasks = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<Task>>(&bytes).map_err(|e| {
                StoreError::Persistence(format!("corrupt task file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StoreError::Persistence(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        tracing::info!(path = %path.display(), count = tasks.len(), "task file loaded");

        Ok(Self {
            tasks: RwLock::new(tasks.into_iter().map(|t| (t.id.clone(), t)).collect()),
            snapshot: Some(path),
        })
    }

    /// Returns the snapshot path, if the store is file-backed.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Returns every task, newest first.
    ///
    /// # Errors
    ///
    /// Never fails for the in-process map; the `Result` keeps the signature
    /// uniform with the mutating operations.
    #[allow(clippy::unnecessary_wraps)]
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut list: Vec<Task> = tasks.values().cloned().collect();
        drop(tasks);
        sort_newest_first(&mut list);
        Ok(list)
    }

    /// Creates a task with a store-assigned id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for blank text, or
    /// [`StoreError::Persistence`] if the snapshot cannot be written.
    pub async fn create(&self, text: &str) -> Result<Task, StoreError> {
        let text = normalize_text(text)?;
        let task = Task::new(TaskId::generate(), text, Utc::now());

        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        if let Err(e) = self.persist(&tasks).await {
            tasks.remove(&task.id);
            return Err(e);
        }
        drop(tasks);

        Ok(task)
    }

    /// Applies the fields present in `patch` to the task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id,
    /// [`StoreError::Validation`] if the patch carries blank text, or
    /// [`StoreError::Persistence`] if the snapshot cannot be written.
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let text = patch.text.as_deref().map(normalize_text).transpose()?;

        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        if patch.is_empty() {
            return Ok(task.clone());
        }

        let previous = task.clone();
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        let updated = task.clone();

        if let Err(e) = self.persist(&tasks).await {
            tasks.insert(id.clone(), previous);
            return Err(e);
        }
        drop(tasks);

        Ok(updated)
    }

    /// Removes the task `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Persistence`] if the snapshot cannot be written.
    pub async fn delete(&self, id: &TaskId) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(removed) = tasks.remove(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        if let Err(e) = self.persist(&tasks).await {
            tasks.insert(id.clone(), removed);
            return Err(e);
        }
        drop(tasks);

        Ok(removed)
    }

    /// Returns the number of tasks currently stored.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Rewrites the snapshot file from `tasks`. No-op for in-memory stores.
    async fn persist(&self, tasks: &HashMap<TaskId, Task>) -> Result<(), StoreError> {
        let Some(path) = self.snapshot.as_deref() else {
            return Ok(());
        };

        let mut list: Vec<&Task> = tasks.values().collect();
        list.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        let bytes = serde_json::to_vec_pretty(&list)
            .map_err(|e| StoreError::Persistence(format!("encode failed: {e}")))?;

        write_atomic(path, &bytes).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "task file write failed");
            StoreError::Persistence(format!("failed to write {}: {e}", path.display()))
        })
    }
}

/// Writes `bytes` to a sibling temp file and renames it over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
