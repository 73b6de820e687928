//! Decision log
//!
//! Appends one JSON line per post-job run so operators can audit why a cache
//! was or was not saved. Disabled unless a path is configured.

use crate::cache::CacheSignals;
use crate::engine::Decision;
use crate::error::CachePostError;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based decision logger that appends JSON lines
pub struct DecisionLog {
    path: PathBuf,
    run_id: u64,
}

impl DecisionLog {
    pub fn new(path: PathBuf, run_id: u64) -> Self {
        Self { path, run_id }
    }

    /// Record a decision and the result of acting on it as a JSON line
    ///
    /// `error` is the save failure, if any. IO failures are logged and dropped; the log never changes the outcome
    /// of the run.
    pub async fn record(
        &self,
        decision: Decision,
        signals: &CacheSignals,
        error: Option<&CachePostError>,
    ) {
        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "run_id": self.run_id,
            "decision": decision.as_str(),
            "key": signals.computed_key.primary,
            "cache_hit": signals.cache_hit,
            "paths": signals.cached_paths.len(),
            "result": if error.is_some() { "failed" } else { "ok" },
            "error": error.map(|e| e.to_string()),
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize decision record: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write decision log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
