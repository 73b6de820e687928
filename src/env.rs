//! Snapshot of the CI runner environment
//!
//! GitHub Actions hands a post-job step three kinds of values through the
//! process environment:
//!
//! | Kind | Variable | Example |
//! |------|----------|---------|
//! | Runner context | as-is | `GITHUB_RUN_ID` |
//! | Action input | `INPUT_<NAME>` | `INPUT_GITHUBTOKEN` |
//! | Saved state | `STATE_<name>` | `STATE_cacheHit` |
//!
//! The snapshot is taken once at startup and never re-read.

use crate::error::{CachePostError, CachePostResult};
use std::collections::HashMap;

/// Immutable view of the environment variables the post step reads
#[derive(Debug, Clone, Default)]
pub struct ActionEnv {
    vars: HashMap<String, String>,
}

impl ActionEnv {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, treating empty values as unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Get a variable that must be present
    pub fn require(&self, name: &str) -> CachePostResult<&str> {
        self.get(name)
            .ok_or_else(|| CachePostError::EnvMissing(name.to_string()))
    }

    /// Get an action input by its declared name
    pub fn input(&self, name: &str) -> Option<&str> {
        self.get(&Self::input_var(name))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Get a value saved by the pre-job phase
    pub fn state(&self, name: &str) -> Option<&str> {
        self.get(&Self::state_var(name))
    }

    /// Environment variable that carries an action input
    pub fn input_var(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }

    /// Environment variable that carries saved state
    pub fn state_var(name: &str) -> String {
        format!("STATE_{}", name)
    }

    /// Whether we are running inside a GitHub Actions runner
    pub fn is_github_actions(&self) -> bool {
        self.get("GITHUB_ACTIONS") == Some("true")
    }

    /// Whether the runner has step debug logging enabled
    pub fn runner_debug(&self) -> bool {
        self.get("RUNNER_DEBUG") == Some("1")
    }
}
