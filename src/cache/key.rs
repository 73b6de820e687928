//! Computed cache key as saved by the pre-job phase

use crate::error::{CachePostError, CachePostResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key addressing a cache entry, plus fallback prefixes used on restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub primary: String,
    #[serde(default)]
    pub restore: Vec<String>,
}

impl CacheKey {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            restore: Vec::new(),
        }
    }

    /// Parse the JSON form written to action state
    pub fn from_state(name: &str, json: &str) -> CachePostResult<Self> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| CachePostError::env_invalid(name, format!("not a cache key: {}", e)))?;

        if key.primary.trim().is_empty() {
            return Err(CachePostError::env_invalid(name, "primary key is empty"));
        }

        Ok(key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)
    }
}
