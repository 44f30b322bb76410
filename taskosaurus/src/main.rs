//! Taskosaurus: terminal to-do list.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskosaurus/config.toml`).
//!
//! ```bash
//! # Tasks kept in a local JSON document (default)
//! cargo run --bin taskosaurus
//!
//! # Synchronize with a task server
//! cargo run --bin taskosaurus -- --backend remote --server-url http://127.0.0.1:5000
//!
//! # Throwaway session
//! TASKOSAURUS_BACKEND=memory cargo run --bin taskosaurus
//! ```

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskosaurus::app::App;
use taskosaurus::backend::{BackendError, TaskBackend};
use taskosaurus::client::worker::spawn_sync_worker;
use taskosaurus::client::{SyncCommand, SyncEvent};
use taskosaurus::config::{CliArgs, ClientConfig};
use taskosaurus::ui;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to a file; the terminal belongs to the UI.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let backend = match config.build_backend() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(backend = %backend.describe(), "taskosaurus starting");

    match run(backend, &config) {
        Ok(()) => {
            tracing::info!("taskosaurus exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Set up the terminal, run the app, and restore the terminal.
fn run<B: TaskBackend>(backend: B, config: &ClientConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, backend, config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskosaurus.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Runs on the runtime's main thread; backend calls happen on worker threads.
fn run_app<B: TaskBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    backend: B,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new(backend.describe());
    let (cmd_tx, mut evt_rx) = spawn_sync_worker(backend, config.channel_capacity);

    let initial = app.start();
    dispatch(&mut app, &cmd_tx, vec![initial]);

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        drain_sync_events(&mut app, &mut evt_rx);

        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let commands = app.handle_key_event(key);
            dispatch(&mut app, &cmd_tx, commands);
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand commands to the sync worker without blocking the UI.
///
/// A command the worker cannot take is answered locally with a transport
/// failure, which releases its pending marker and raises a notice.
fn dispatch(app: &mut App, tx: &mpsc::Sender<SyncCommand>, commands: Vec<SyncCommand>) {
    for command in commands {
        if let Err(e) = tx.try_send(command) {
            let command = e.into_inner();
            tracing::warn!(?command, "sync worker unavailable");
            if let Some(event) =
                command.fail(BackendError::Transport("sync worker unavailable".to_string()))
            {
                app.apply_event(event);
            }
        }
    }
}

/// Drain all pending `SyncEvent`s and apply them to the app.
fn drain_sync_events(app: &mut App, rx: &mut mpsc::Receiver<SyncEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.apply_event(event);
    }
}
