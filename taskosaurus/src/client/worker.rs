//! Background sync worker bridging the synchronous TUI loop and a backend.
//!
//! ```text
//! TUI (main thread)  ←── SyncEvent ───  tokio worker
//!                     ─── SyncCommand →
//! ```
//!
//! The main thread sends [`SyncCommand`]s and drains [`SyncEvent`]s on each
//! tick. Every command runs in its own task, so a slow request never blocks
//! the ones queued behind it.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::sync::{SyncCommand, SyncEvent, execute};
use crate::backend::TaskBackend;

/// Spawns the sync worker for `backend`.
///
/// Returns the command sender and event receiver. The worker stops on
/// [`SyncCommand::Shutdown`] or when every sender is dropped.
pub fn spawn_sync_worker<B: TaskBackend>(
    backend: B,
    channel_capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(channel_capacity);

    tokio::spawn(command_loop(Arc::new(backend), cmd_rx, evt_tx));

    (cmd_tx, evt_rx)
}

async fn command_loop<B: TaskBackend>(
    backend: Arc<B>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    tracing::info!(backend = %backend.describe(), "sync worker started");

    while let Some(command) = cmd_rx.recv().await {
        if command == SyncCommand::Shutdown {
            break;
        }
        tracing::debug!(?command, "sync command");

        let backend = Arc::clone(&backend);
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            if let Some(event) = execute(backend.as_ref(), command).await
                && evt_tx.send(event).await.is_err()
            {
                tracing::debug!("event receiver dropped");
            }
        });
    }

    tracing::info!("sync worker stopped");
}
