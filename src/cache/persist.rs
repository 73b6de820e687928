//! Cache persistence collaborators
//!
//! The decision engine only decides; uploading is done by whatever
//! implements [`CachePersistence`]. A save must be safe to re-run.

use crate::cache::key::CacheKey;
use crate::error::{CachePostError, CachePostResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Whether the cache-hit token says the primary key was restored exactly
pub fn is_cache_hit(cache_hit: &str) -> bool {
    cache_hit.trim().eq_ignore_ascii_case("true")
}

/// Saves the cached paths under a key
#[async_trait]
pub trait CachePersistence: Send + Sync {
    /// Persist `paths` under `key`. `cache_hit` is the opaque token from the
    /// pre-job phase; implementations may skip an unchanged key.
    async fn save(&self, paths: &[String], key: &CacheKey, cache_hit: &str) -> CachePostResult<()>;

    /// Human-readable collaborator name for logs
    fn name(&self) -> &'static str;
}

/// Runs an external save command
///
/// The command receives everything through its environment:
/// `CACHE_KEY_PRIMARY`, `CACHE_KEY_RESTORE` (newline separated),
/// `CACHE_HIT` and `CACHE_PATHS` (newline separated, in order).
#[derive(Debug, Clone)]
pub struct CommandPersistence {
    program: String,
    args: Vec<String>,
}

impl CommandPersistence {
    /// Build from a `[program, args...]` list
    pub fn from_command(command: &[String]) -> CachePostResult<Self> {
        let (program, args) = command.split_first().ok_or(CachePostError::NoSaveCommand)?;
        if program.trim().is_empty() {
            return Err(CachePostError::NoSaveCommand);
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl CachePersistence for CommandPersistence {
    async fn save(&self, paths: &[String], key: &CacheKey, cache_hit: &str) -> CachePostResult<()> {
        if is_cache_hit(cache_hit) {
            info!("Cache hit on primary key {}, not saving", key);
            return Ok(());
        }

        let command = self.display();
        debug!("Executing: {}", command);

        let output = Command::new(&self.program)
            .args(&self.args)
            .env("CACHE_KEY_PRIMARY", &key.primary)
            .env("CACHE_KEY_RESTORE", key.restore.join("\n"))
            .env("CACHE_HIT", cache_hit)
            .env("CACHE_PATHS", paths.join("\n"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CachePostError::command_failed(&command, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!("{}", line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CachePostError::Persistence {
                key: key.primary.clone(),
                reason: format!(
                    "{} exited with {}: {}",
                    command,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        info!("Cache saved with key {}", key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Logs what would be saved without saving anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPersistence;

#[async_trait]
impl CachePersistence for DryRunPersistence {
    async fn save(&self, paths: &[String], key: &CacheKey, cache_hit: &str) -> CachePostResult<()> {
        if is_cache_hit(cache_hit) {
            info!("Dry run: cache hit on primary key {}, would not save", key);
            return Ok(());
        }

        info!(
            key = %key,
            cache_hit = %cache_hit,
            "Dry run: would save {} path(s)",
            paths.len()
        );
        for path in paths {
            info!("  {}", path);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
