//! Integration tests for the TUI ↔ sync worker wiring.
//!
//! Drives [`App`] with key events, ships the resulting commands to a real
//! sync worker over a [`MemoryBackend`] or [`LocalBackend`], and folds the
//! answers back in the way the main loop does.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use taskosaurus::app::{App, PanelFocus};
use taskosaurus::backend::{LocalBackend, MemoryBackend, TaskBackend};
use taskosaurus::client::worker::spawn_sync_worker;
use taskosaurus::client::{EditState, LoadState, NoticeLevel, SyncCommand, SyncEvent};
use taskosaurus_proto::filter::FilterMode;

struct Harness {
    app: App,
    tx: mpsc::Sender<SyncCommand>,
    rx: mpsc::Receiver<SyncEvent>,
}

impl Harness {
    async fn start<B: TaskBackend>(backend: B) -> Self {
        let app = App::new(backend.describe());
        let (tx, rx) = spawn_sync_worker(backend, 16);
        let mut harness = Self { app, tx, rx };
        let initial = harness.app.start();
        harness.dispatch(vec![initial]).await;
        harness
    }

    /// Sends `commands` and applies exactly one event per command.
    async fn dispatch(&mut self, commands: Vec<SyncCommand>) {
        let expected = commands.len();
        for command in commands {
            self.tx.send(command).await.unwrap();
        }
        for _ in 0..expected {
            let event = tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
                .await
                .expect("sync worker timed out")
                .expect("sync worker stopped");
            self.app.apply_event(event);
        }
    }

    async fn press(&mut self, code: KeyCode) {
        let commands = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
        self.dispatch(commands).await;
    }

    async fn type_line(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
        self.press(KeyCode::Enter).await;
    }

    fn texts(&self) -> Vec<String> {
        self.app
            .tasks
            .visible_tasks()
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }
}

#[tokio::test]
async fn initial_load_marks_ready() {
    let h = Harness::start(MemoryBackend::new()).await;
    assert_eq!(h.app.tasks.load_state(), &LoadState::Ready);
    assert!(h.texts().is_empty());
}

#[tokio::test]
async fn typed_tasks_appear_newest_first() {
    let mut h = Harness::start(MemoryBackend::new()).await;
    h.type_line("buy milk").await;
    h.type_line("walk dog").await;
    assert_eq!(h.texts(), ["walk dog", "buy milk"]);
    assert!(h.app.input.is_empty());
}

#[tokio::test]
async fn toggle_edit_delete_via_keys() {
    let mut h = Harness::start(MemoryBackend::new()).await;
    h.type_line("draft").await;
    h.press(KeyCode::Tab).await;
    assert_eq!(h.app.focus, PanelFocus::List);

    h.press(KeyCode::Char(' ')).await;
    assert!(h.app.tasks.tasks()[0].completed);

    h.press(KeyCode::Char('e')).await;
    for _ in 0.."draft".len() {
        h.press(KeyCode::Backspace).await;
    }
    for c in "final".chars() {
        h.press(KeyCode::Char(c)).await;
    }
    h.press(KeyCode::Enter).await;
    assert_eq!(h.app.tasks.edit_state(), &EditState::Viewing);
    assert_eq!(h.texts(), ["final"]);
    assert!(h.app.tasks.tasks()[0].completed);

    h.press(KeyCode::Char('d')).await;
    assert!(h.texts().is_empty());
    assert!(!h.app.tasks.has_pending());
}

#[tokio::test]
async fn clear_completed_and_filters() {
    let mut h = Harness::start(MemoryBackend::new()).await;
    for text in ["a", "b", "c"] {
        h.type_line(text).await;
    }
    h.press(KeyCode::Tab).await;
    // Visible order is c, b, a: complete c and a.
    h.press(KeyCode::Char(' ')).await;
    h.press(KeyCode::Down).await;
    h.press(KeyCode::Down).await;
    h.press(KeyCode::Char(' ')).await;

    h.press(KeyCode::Char('x')).await;
    assert_eq!(h.app.tasks.filter(), FilterMode::Completed);
    assert_eq!(h.texts(), ["c", "a"]);

    h.press(KeyCode::Char('c')).await;
    assert!(h.texts().is_empty());
    let notice = h.app.tasks.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);

    h.press(KeyCode::Char('a')).await;
    assert_eq!(h.texts(), ["b"]);
}

#[tokio::test]
async fn local_backend_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = Harness::start(LocalBackend::new(dir.path())).await;
    first.type_line("remember me").await;
    first.tx.send(SyncCommand::Shutdown).await.unwrap();

    let second = Harness::start(LocalBackend::new(dir.path())).await;
    assert_eq!(second.texts(), ["remember me"]);
}

#[tokio::test]
async fn failed_create_returns_text_to_input() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the storage directory should be makes every write fail.
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let mut h = Harness::start(LocalBackend::new(&blocker)).await;
    h.type_line("unsaved").await;

    assert!(h.texts().is_empty());
    assert_eq!(h.app.input, "unsaved");
    assert_eq!(h.app.tasks.notice().unwrap().level, NoticeLevel::Error);
}
