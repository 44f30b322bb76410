//! Configuration system for the Taskosaurus client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskosaurus/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::remote::DEFAULT_REQUEST_TIMEOUT;
use crate::backend::{Backend, BackendError, LocalBackend, MemoryBackend, RemoteBackend};

/// Default task server URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Which persistence layer the client synchronizes with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Nothing survives the process.
    Memory,
    /// JSON document in the storage directory.
    #[default]
    Local,
    /// The Taskosaurus HTTP server.
    Remote,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    backend: BackendFileConfig,
    ui: UiFileConfig,
}

/// `[backend]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BackendFileConfig {
    kind: Option<BackendKind>,
    server_url: Option<String>,
    storage_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    channel_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Backend --
    /// Persistence layer to use.
    pub backend: BackendKind,
    /// Base URL of the task server (remote backend).
    pub server_url: String,
    /// Directory holding the local task document (local backend).
    pub storage_dir: PathBuf,
    /// Per-request timeout (remote backend).
    pub request_timeout: Duration,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Channel capacity for the sync command/event channels.
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            storage_dir: default_storage_dir(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_timeout: Duration::from_millis(50),
            channel_capacity: 256,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/taskosaurus/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            backend: cli
                .backend
                .or(file.backend.kind)
                .unwrap_or(defaults.backend),
            server_url: cli
                .server_url
                .clone()
                .or_else(|| file.backend.server_url.clone())
                .unwrap_or(defaults.server_url),
            storage_dir: cli
                .storage_dir
                .clone()
                .or_else(|| file.backend.storage_dir.clone())
                .unwrap_or(defaults.storage_dir),
            request_timeout: file
                .backend
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            channel_capacity: file
                .ui
                .channel_capacity
                .filter(|&c| c > 0)
                .unwrap_or(defaults.channel_capacity),
        }
    }

    /// Build the configured persistence layer.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the server URL is invalid.
    pub fn build_backend(&self) -> Result<Backend, BackendError> {
        Ok(match self.backend {
            BackendKind::Memory => Backend::Memory(MemoryBackend::new()),
            BackendKind::Local => Backend::Local(LocalBackend::new(&self.storage_dir)),
            BackendKind::Remote => Backend::Remote(RemoteBackend::new(
                &self.server_url,
                self.request_timeout,
            )?),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal to-do list")]
pub struct CliArgs {
    /// Persistence layer (memory, local, remote).
    #[arg(long, value_enum, env = "TASKOSAURUS_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Base URL of the task server.
    #[arg(long, env = "TASKOSAURUS_URL")]
    pub server_url: Option<String>,

    /// Directory for the local task document.
    #[arg(long, env = "TASKOSAURUS_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskosaurus/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKOSAURUS_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskosaurus.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_storage_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".taskosaurus"), |d| d.join("taskosaurus"))
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskosaurus").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
