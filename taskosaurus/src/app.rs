//! Application state and event handling.
//!
//! Key handling never talks to a backend: it mutates the [`TaskList`] and
//! returns the [`SyncCommand`]s the caller must dispatch to the sync worker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::TaskId;

use crate::client::{ClientError, Notice, SyncCommand, SyncEvent, TaskList};

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// New-task input box (default).
    Input,
    /// Task list.
    List,
}

/// Main application state.
pub struct App {
    /// Task collection, filter and editing session.
    pub tasks: TaskList,
    /// Current text in the new-task input.
    pub input: String,
    /// Cursor position in input (character index).
    pub cursor_position: usize,
    /// Which panel is focused.
    pub focus: PanelFocus,
    /// Selected row among the visible tasks.
    pub selected: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Description of the persistence layer for the status bar.
    pub backend_label: String,
}

impl App {
    /// Creates an app with an empty task list.
    #[must_use]
    pub fn new(backend_label: impl Into<String>) -> Self {
        Self {
            tasks: TaskList::new(),
            input: String::new(),
            cursor_position: 0,
            focus: PanelFocus::Input,
            selected: 0,
            should_quit: false,
            backend_label: backend_label.into(),
        }
    }

    /// Starts the initial fetch.
    pub fn start(&mut self) -> SyncCommand {
        self.tasks.request_load()
    }

    /// Id of the selected visible task.
    #[must_use]
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.tasks
            .visible_tasks()
            .get(self.selected)
            .map(|t| t.id.clone())
    }

    /// Folds a sync event into the state.
    pub fn apply_event(&mut self, event: SyncEvent) {
        // Failures already raised a notice.
        let _ = self.tasks.apply(event);

        if let Some(text) = self.tasks.take_returned_input()
            && self.input.is_empty()
        {
            self.cursor_position = text.chars().count();
            self.input = text;
        }
        self.clamp_selection();
    }

    /// Handle a key press, returning commands to dispatch.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Vec<SyncCommand> {
        self.tasks.clear_notice();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }

        if self.tasks.editing_id().is_some() {
            return self.handle_edit_key(key);
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            PanelFocus::Input => self.handle_input_key(key),
            PanelFocus::List => self.handle_list_key(key),
        }
    }

    /// Handle key event while a task is being edited.
    fn handle_edit_key(&mut self, key: KeyEvent) -> Vec<SyncCommand> {
        match key.code {
            KeyCode::Enter => {
                let result = self
                    .tasks
                    .commit_edit()
                    .map(|command| command.into_iter().collect());
                self.command_or_notice(result)
            }
            KeyCode::Esc => {
                self.tasks.cancel_edit();
                Vec::new()
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.tasks.edit_buffer_mut() {
                    buffer.pop();
                }
                Vec::new()
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.tasks.edit_buffer_mut() {
                    buffer.push(c);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Handle key event when input is focused.
    fn handle_input_key(&mut self, key: KeyEvent) -> Vec<SyncCommand> {
        match key.code {
            KeyCode::Enter => return self.submit_input(),
            KeyCode::Char(c) => self.enter_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input.chars().count(),
            _ => {}
        }
        Vec::new()
    }

    /// Handle key event when the task list is focused.
    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<SyncCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task_id() {
                    let result = self.tasks.request_toggle(&id).map(|c| vec![c]);
                    return self.command_or_notice(result);
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.selected_task_id() {
                    let result = self.tasks.start_editing(&id).map(|()| Vec::new());
                    return self.command_or_notice(result);
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    let result = self.tasks.request_remove(&id).map(|c| vec![c]);
                    return self.command_or_notice(result);
                }
            }
            KeyCode::Char('c') => {
                let result = self.tasks.request_clear_completed();
                if matches!(&result, Ok(commands) if commands.is_empty()) {
                    self.tasks.set_notice(Notice::info("No completed tasks to clear"));
                }
                return self.command_or_notice(result);
            }
            KeyCode::Char('a' | '1') => self.set_filter(FilterMode::All),
            KeyCode::Char('o' | '2') => self.set_filter(FilterMode::Active),
            KeyCode::Char('x' | '3') => self.set_filter(FilterMode::Completed),
            _ => {}
        }
        Vec::new()
    }

    /// Submit the input as a new task.
    fn submit_input(&mut self) -> Vec<SyncCommand> {
        let Some(command) = self.tasks.request_add(&self.input) else {
            return Vec::new();
        };
        self.input.clear();
        self.cursor_position = 0;
        vec![command]
    }

    fn command_or_notice(
        &mut self,
        result: Result<Vec<SyncCommand>, ClientError>,
    ) -> Vec<SyncCommand> {
        result.unwrap_or_else(|e| {
            self.tasks.set_notice(Notice::error(e.to_string()));
            Vec::new()
        })
    }

    fn set_filter(&mut self, mode: FilterMode) {
        self.tasks.set_filter(mode);
        self.clamp_selection();
    }

    const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Input => PanelFocus::List,
            PanelFocus::List => PanelFocus::Input,
        };
    }

    /// Byte offset of the cursor in `input`.
    fn cursor_byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.input.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    fn enter_char(&mut self, c: char) {
        let index = self.cursor_byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.cursor_byte_index();
            self.input.remove(index);
        }
    }

    const fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.visible_tasks().len() {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
