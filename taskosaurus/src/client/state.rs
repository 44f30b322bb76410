//! Client-side task state.
//!
//! [`TaskList`] is the single source of truth the UI renders from. It never
//! performs I/O: every mutation is split into a *request* step, which
//! validates, marks the task as pending and returns a [`SyncCommand`], and
//! an [`apply`](TaskList::apply) step, which folds the persistence layer's
//! [`SyncEvent`] back in. Local entries are only ever replaced by canonical
//! records from the layer, and removals only happen after the layer
//! acknowledged them.
//!
//! At most one request per task id may be outstanding; a second one is
//! refused with [`ClientError::Busy`].

use std::collections::HashSet;

use taskosaurus_proto::api::TaskPatch;
use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::{Task, TaskId, normalize_text};

use super::ClientError;
use super::sync::{SyncCommand, SyncEvent};
use crate::backend::BackendError;

/// Progress of the initial fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Fetch in flight; the list must not be shown as empty.
    Loading,
    /// Collection reflects the persistence layer.
    Ready,
    /// Fetch failed; the collection is empty.
    Failed(String),
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user asked for did not happen.
    Error,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub text: String,
}

impl Notice {
    /// Creates an informational notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Per-task editing state. At most one task is edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    /// No task is being edited.
    #[default]
    Viewing,
    /// `id` is being edited; `buffer` holds the unsaved text.
    Editing {
        /// Task under edit.
        id: TaskId,
        /// Unsaved text.
        buffer: String,
    },
}

/// Outcome of a bulk clear of completed tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Deletions issued.
    pub requested: usize,
    /// Deletions acknowledged.
    pub removed: usize,
    /// Deletions that failed.
    pub failed: usize,
}

impl ClearReport {
    /// `true` when every requested deletion was acknowledged.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed == 0 && self.removed == self.requested
    }

    const fn is_finished(&self) -> bool {
        self.removed + self.failed >= self.requested
    }
}

/// Bulk clear in progress.
#[derive(Debug, Clone, Copy)]
struct ClearBatch {
    id: u64,
    report: ClearReport,
}

/// Successful result of [`TaskList::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The collection was replaced with this many tasks.
    Loaded(usize),
    /// A canonical task was inserted at the head.
    Created(Task),
    /// A local entry was replaced by its canonical record.
    Updated(Task),
    /// A task was removed after acknowledgement.
    Removed(TaskId),
}

/// The client's working copy of the task collection.
#[derive(Debug, Default)]
pub struct TaskList {
    /// Newest first.
    tasks: Vec<Task>,
    filter: FilterMode,
    load_state: LoadState,
    /// Ids with an update or delete in flight.
    pending: HashSet<TaskId>,
    /// Creates in flight.
    creating: usize,
    edit: EditState,
    clear: Option<ClearBatch>,
    next_batch: u64,
    last_clear: Option<ClearReport>,
    /// Outcomes confirmed while a fetch is in flight, replayed onto its result.
    since_load: Vec<Applied>,
    /// Text of a failed create, waiting to go back into the input.
    returned_input: Option<String>,
    notice: Option<Notice>,
}

impl TaskList {
    /// Creates an empty, idle task list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// All tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Current view filter.
    #[must_use]
    pub const fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Changes the view filter. Never touches the collection.
    pub const fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    /// Tasks matching the current filter, newest first.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    /// Number of tasks not yet completed.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Number of completed tasks.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Progress of the initial fetch.
    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// `true` while the collection is being fetched.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading)
    }

    /// `true` if `id` has a request in flight.
    #[must_use]
    pub fn is_pending(&self, id: &TaskId) -> bool {
        self.pending.contains(id)
    }

    /// `true` if any request is in flight.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.creating > 0 || self.is_loading()
    }

    /// Latest notice for the user.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Replaces the current notice.
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Dismisses the current notice.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Takes the text of the last failed create, if any.
    pub const fn take_returned_input(&mut self) -> Option<String> {
        self.returned_input.take()
    }

    /// Takes the report of the last finished bulk clear, if any.
    pub const fn take_clear_report(&mut self) -> Option<ClearReport> {
        self.last_clear.take()
    }

    /// `true` while a bulk clear has deletions outstanding.
    #[must_use]
    pub const fn clear_in_progress(&self) -> bool {
        self.clear.is_some()
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Starts fetching the collection.
    pub fn request_load(&mut self) -> SyncCommand {
        self.load_state = LoadState::Loading;
        self.since_load.clear();
        SyncCommand::Load
    }

    /// Requests creation of a task. Returns `None` for blank text.
    pub fn request_add(&mut self, text: &str) -> Option<SyncCommand> {
        let text = normalize_text(text).ok()?;
        self.creating += 1;
        Some(SyncCommand::Create { text })
    }

    /// Requests flipping `completed` on task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTask`] or [`ClientError::Busy`].
    pub fn request_toggle(&mut self, id: &TaskId) -> Result<SyncCommand, ClientError> {
        let completed = self.idle_task(id)?.completed;
        self.pending.insert(id.clone());
        Ok(SyncCommand::Update {
            id: id.clone(),
            patch: TaskPatch::completed(!completed),
        })
    }

    /// Requests replacing the text of task `id`. Returns `Ok(None)` for
    /// blank text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTask`] or [`ClientError::Busy`].
    pub fn request_edit(
        &mut self,
        id: &TaskId,
        text: &str,
    ) -> Result<Option<SyncCommand>, ClientError> {
        let Ok(text) = normalize_text(text) else {
            return Ok(None);
        };
        self.idle_task(id)?;
        self.pending.insert(id.clone());
        Ok(Some(SyncCommand::Update {
            id: id.clone(),
            patch: TaskPatch::text(text),
        }))
    }

    /// Requests deletion of task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTask`] or [`ClientError::Busy`].
    pub fn request_remove(&mut self, id: &TaskId) -> Result<SyncCommand, ClientError> {
        self.idle_task(id)?;
        self.pending.insert(id.clone());
        Ok(SyncCommand::Delete {
            id: id.clone(),
            batch: None,
        })
    }

    /// Requests one deletion per completed task.
    ///
    /// Tasks that already have a request in flight are left alone. Returns
    /// an empty list when there is nothing to clear.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ClearInProgress`] if a previous clear has not
    /// finished.
    pub fn request_clear_completed(&mut self) -> Result<Vec<SyncCommand>, ClientError> {
        if self.clear.is_some() {
            return Err(ClientError::ClearInProgress);
        }

        let ids: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.completed && !self.pending.contains(&t.id))
            .map(|t| t.id.clone())
            .collect();
        if ids.is_empty() {
            self.last_clear = Some(ClearReport::default());
            return Ok(Vec::new());
        }

        let batch = self.next_batch;
        self.next_batch += 1;
        self.clear = Some(ClearBatch {
            id: batch,
            report: ClearReport {
                requested: ids.len(),
                ..ClearReport::default()
            },
        });

        Ok(ids
            .into_iter()
            .map(|id| {
                self.pending.insert(id.clone());
                SyncCommand::Delete {
                    id,
                    batch: Some(batch),
                }
            })
            .collect())
    }

    /// Returns the task if it exists and has nothing in flight.
    fn idle_task(&self, id: &TaskId) -> Result<&Task, ClientError> {
        let task = self
            .get(id)
            .ok_or_else(|| ClientError::UnknownTask(id.clone()))?;
        if self.pending.contains(id) {
            return Err(ClientError::Busy(id.clone()));
        }
        Ok(task)
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Current editing state.
    #[must_use]
    pub const fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Id of the task being edited.
    #[must_use]
    pub const fn editing_id(&self) -> Option<&TaskId> {
        match &self.edit {
            EditState::Editing { id, .. } => Some(id),
            EditState::Viewing => None,
        }
    }

    /// Mutable access to the edit buffer while editing.
    pub const fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditState::Editing { buffer, .. } => Some(buffer),
            EditState::Viewing => None,
        }
    }

    /// Enters editing mode for `id`, discarding any other unsaved edit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTask`] or [`ClientError::Busy`].
    pub fn start_editing(&mut self, id: &TaskId) -> Result<(), ClientError> {
        let buffer = self.idle_task(id)?.text.clone();
        if let Some(previous) = self.editing_id()
            && previous != id
        {
            tracing::debug!(task_id = %previous, "edit discarded");
        }
        self.edit = EditState::Editing {
            id: id.clone(),
            buffer,
        };
        Ok(())
    }

    /// Leaves editing mode without saving.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Viewing;
    }

    /// Leaves editing mode, returning the update to send if the buffer holds
    /// new, non-blank text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownTask`] or [`ClientError::Busy`] if the
    /// edited task vanished or got a request in flight meanwhile.
    ///
    /// On [`ClientError::Busy`] the session stays open with its buffer, so
    /// the commit can be retried once the task settles.
    pub fn commit_edit(&mut self) -> Result<Option<SyncCommand>, ClientError> {
        let (id, text) = match &self.edit {
            EditState::Editing { id, buffer } => (id.clone(), normalize_text(buffer)),
            EditState::Viewing => return Ok(None),
        };
        let Ok(text) = text else {
            self.cancel_edit();
            return Ok(None);
        };
        if self.get(&id).is_some_and(|t| t.text == text) {
            self.cancel_edit();
            return Ok(None);
        }
        let result = self.request_edit(&id, &text);
        if !matches!(result, Err(ClientError::Busy(_))) {
            self.cancel_edit();
        }
        result
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Folds a persistence-layer answer into the collection.
    ///
    /// # Errors
    ///
    /// Returns the layer's error when the request failed. The collection is
    /// left as it was and an error notice is raised.
    pub fn apply(&mut self, event: SyncEvent) -> Result<Applied, BackendError> {
        match event {
            SyncEvent::Loaded(Ok(tasks)) => {
                self.tasks = tasks;
                for confirmed in std::mem::take(&mut self.since_load) {
                    self.replay(confirmed);
                }
                let count = self.tasks.len();
                self.load_state = LoadState::Ready;
                if let Some(id) = self.editing_id()
                    && self.get(id).is_none()
                {
                    self.cancel_edit();
                }
                tracing::info!(count, "tasks loaded");
                Ok(Applied::Loaded(count))
            }
            SyncEvent::Loaded(Err(e)) => {
                self.tasks.clear();
                self.since_load.clear();
                self.load_state = LoadState::Failed(e.to_string());
                self.fail("Could not load tasks", &e);
                Err(e)
            }
            SyncEvent::Created { text, result } => {
                self.creating = self.creating.saturating_sub(1);
                match result {
                    Ok(task) => {
                        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                            *slot = task.clone();
                        } else {
                            self.tasks.insert(0, task.clone());
                        }
                        Ok(self.confirmed(Applied::Created(task)))
                    }
                    Err(e) => {
                        self.returned_input = Some(text);
                        self.fail("Could not add task", &e);
                        Err(e)
                    }
                }
            }
            SyncEvent::Updated { id, result } => {
                self.pending.remove(&id);
                match result {
                    Ok(task) => {
                        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
                            *slot = task.clone();
                        } else {
                            tracing::debug!(task_id = %id, "update for task no longer listed");
                        }
                        Ok(self.confirmed(Applied::Updated(task)))
                    }
                    Err(e) => {
                        self.fail("Could not update task", &e);
                        Err(e)
                    }
                }
            }
            SyncEvent::Deleted { id, batch, result } => {
                self.pending.remove(&id);
                let outcome = match result {
                    Ok(()) => {
                        self.tasks.retain(|t| t.id != id);
                        if self.editing_id() == Some(&id) {
                            self.cancel_edit();
                        }
                        Ok(self.confirmed(Applied::Removed(id)))
                    }
                    Err(e) => {
                        if batch.is_none() {
                            self.fail("Could not delete task", &e);
                        } else {
                            tracing::warn!(task_id = %id, error = %e, "bulk delete failed");
                        }
                        Err(e)
                    }
                };
                if let Some(batch) = batch {
                    self.record_clear(batch, outcome.is_ok());
                }
                outcome
            }
        }
    }

    /// Remembers a confirmed outcome while a fetch is in flight, since the
    /// fetched collection may predate it.
    fn confirmed(&mut self, applied: Applied) -> Applied {
        if self.is_loading() {
            self.since_load.push(applied.clone());
        }
        applied
    }

    /// Re-applies a confirmed outcome onto a freshly fetched collection.
    fn replay(&mut self, applied: Applied) {
        match applied {
            Applied::Created(task) => {
                if self.get(&task.id).is_none() {
                    self.tasks.insert(0, task);
                }
            }
            Applied::Updated(task) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            Applied::Removed(id) => self.tasks.retain(|t| t.id != id),
            Applied::Loaded(_) => {}
        }
    }

    /// Counts one finished deletion of a bulk clear.
    fn record_clear(&mut self, batch: u64, removed: bool) {
        let Some(clear) = self.clear.as_mut().filter(|c| c.id == batch) else {
            return;
        };
        if removed {
            clear.report.removed += 1;
        } else {
            clear.report.failed += 1;
        }
        if !clear.report.is_finished() {
            return;
        }

        let report = clear.report;
        self.clear = None;
        self.last_clear = Some(report);
        self.notice = Some(if report.is_complete() {
            Notice::info(format!("Cleared {} completed task(s)", report.removed))
        } else {
            Notice::error(format!(
                "Cleared {} of {} completed tasks; {} failed",
                report.removed, report.requested, report.failed
            ))
        });
    }

    /// Records a failure notice.
    fn fail(&mut self, action: &str, err: &BackendError) {
        tracing::warn!(error = %err, action, "task request failed");
        self.notice = Some(Notice::error(format!("{action}: {err}")));
    }
}
