//! Configuration schema for cachepost
//!
//! Configuration is stored at `~/.config/cachepost/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// GitHub API settings
    pub github: GithubConfig,

    /// Cache policy settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format
    pub log_format: LogFormat,

    /// Append one JSON line per decision to this file
    pub decision_log: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// REST API base URL
    pub api_url: String,

    /// User-Agent header sent with API requests
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            user_agent: format!("cachepost/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Which fields of the workflow run decide whether the job succeeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCheck {
    /// `status == "success"`
    #[default]
    Status,
    /// `status == "completed"` and `conclusion == "success"`
    Conclusion,
    /// Either of the above
    Either,
}

/// Cache policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How the job outcome is derived from the workflow run
    pub status_check: StatusCheck,

    /// Default for the doNotCacheOnWorkflowFailure input when it is not set
    pub do_not_cache_on_workflow_failure: bool,

    /// Program and arguments that persist the cache
    pub save_command: Vec<String>,

    /// Subdirectories of the cache root excluded from the cached paths
    pub exclude_subdirs: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            status_check: StatusCheck::Status,
            do_not_cache_on_workflow_failure: false,
            save_command: Vec::new(),
            exclude_subdirs: vec![
                "packages".to_string(),
                "buildtrees".to_string(),
                "downloads".to_string(),
            ],
        }
    }
}
