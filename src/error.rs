//! Error types for cachepost
//!
//! All modules use `CachePostResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cachepost operations
pub type CachePostResult<T> = Result<T, CachePostError>;

/// All errors that can occur in cachepost
#[derive(Error, Debug)]
pub enum CachePostError {
    // Configuration errors
    #[error("Value for '{0}' is not defined")]
    EnvMissing(String),

    #[error("Invalid value for '{name}': {reason}")]
    EnvInvalid { name: String, reason: String },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("No cache save command configured")]
    NoSaveCommand,

    // CI platform errors
    #[error("Failed to query workflow run {run_id}: {reason}")]
    Transport { run_id: u64, reason: String },

    #[error("Malformed workflow run {run_id} response: {source}")]
    RunResponse {
        run_id: u64,
        #[source]
        source: serde_json::Error,
    },

    // Persistence errors
    #[error("Cache save failed for key {key}: {reason}")]
    Persistence { key: String, reason: String },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CachePostError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an invalid environment value error
    pub fn env_invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvInvalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised while reading configuration, before any I/O
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::EnvMissing(_)
                | Self::EnvInvalid { .. }
                | Self::ConfigInvalid { .. }
                | Self::NoSaveCommand
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EnvMissing(_) => {
                Some("cachepost must run as a post-job step inside a GitHub Actions job")
            }
            Self::NoSaveCommand => {
                Some("Set cache.save_command in the config file, or pass --dry-run")
            }
            Self::Transport { .. } => Some("Check network access to the GitHub API"),
            _ => None,
        }
    }
}
