//! Taskosaurus task server -- REST store for the task list.
//!
//! An axum HTTP server exposing create/read/update/delete over `/tasks`.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5000, tasks kept in memory
//! cargo run --bin taskosaurus-server
//!
//! # Persist tasks to a file on a custom address
//! cargo run --bin taskosaurus-server -- --bind 127.0.0.1:8080 --data-file tasks.json
//!
//! # Or via environment variables
//! TASKOSAURUS_ADDR=127.0.0.1:8080 cargo run --bin taskosaurus-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskosaurus_server::api;
use taskosaurus_server::config::{ServerCliArgs, ServerConfig};
use taskosaurus_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskosaurus server");

    let store = match config.data_file {
        Some(ref path) => match TaskStore::open(path).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "failed to open task store");
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("no data file configured, tasks are kept in memory");
            TaskStore::in_memory()
        }
    };

    match api::start_server_with_store(&config.bind_addr, Arc::new(store)).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
