//! Snapshot of everything the decision needs besides the job outcome

use crate::cache::key::CacheKey;
use crate::cache::paths::{cached_paths, split_path_list};
use crate::config::CacheConfig;
use crate::env::ActionEnv;
use crate::error::{CachePostError, CachePostResult};

/// Saved state: caching was disabled by the pre-job phase
pub const DO_NOT_CACHE_STATE: &str = "doNotCache";
/// Saved state: opaque cache-hit token
pub const CACHE_HIT_STATE: &str = "cacheHit";
/// Saved state: JSON-encoded [`CacheKey`]
pub const COMPUTED_KEY_STATE: &str = "computedCacheKey";
/// Saved state: directory whose contents are cached
pub const CACHE_ROOT_STATE: &str = "cacheRoot";

/// Input: skip the save when the job did not succeed
pub const DO_NOT_CACHE_ON_FAILURE_INPUT: &str = "doNotCacheOnWorkflowFailure";
/// Input: extra paths to cache
pub const ADDITIONAL_PATHS_INPUT: &str = "additionalCachedPaths";

/// Carried-over cache state, assembled in full before the decision runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSignals {
    pub do_not_cache: bool,
    pub do_not_cache_on_workflow_failure: bool,
    /// Interpreted by the persistence collaborator only
    pub cache_hit: String,
    pub computed_key: CacheKey,
    pub cached_paths: Vec<String>,
}

impl CacheSignals {
    /// Read all signals from saved state and action inputs
    ///
    /// Fails if any required value is absent; a partially read snapshot is
    /// never returned.
    pub fn from_env(env: &ActionEnv, config: &CacheConfig) -> CachePostResult<Self> {
        let do_not_cache = env
            .state(DO_NOT_CACHE_STATE)
            .map(|v| v == "true")
            .unwrap_or(false);

        let do_not_cache_on_workflow_failure = env
            .input(DO_NOT_CACHE_ON_FAILURE_INPUT)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(config.do_not_cache_on_workflow_failure);

        let cache_hit = env.state(CACHE_HIT_STATE).unwrap_or_default().to_string();

        let key_var = ActionEnv::state_var(COMPUTED_KEY_STATE);
        let computed_key = CacheKey::from_state(&key_var, env.require(&key_var)?)?;

        let root = env
            .state(CACHE_ROOT_STATE)
            .map(str::trim)
            .filter(|root| !root.is_empty())
            .ok_or_else(|| CachePostError::EnvMissing(ActionEnv::state_var(CACHE_ROOT_STATE)))?;
        let additional = env
            .input(ADDITIONAL_PATHS_INPUT)
            .map(split_path_list)
            .unwrap_or_default();

        Ok(Self {
            do_not_cache,
            do_not_cache_on_workflow_failure,
            cache_hit,
            computed_key,
            cached_paths: cached_paths(root, &config.exclude_subdirs, &additional),
        })
    }
}
