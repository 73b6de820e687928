//! Post-job cache decision
//!
//! Combines the resolved job outcome with the carried-over signals into a
//! single save/skip decision and delegates the save.
//!
//! | doNotCache | onFailure policy | job succeeded | Decision |
//! |------------|------------------|---------------|----------|
//! | true | any | any | skip |
//! | false | true | false | skip |
//! | false | false | any | save |
//! | false | true | true | save |

use crate::audit::DecisionLog;
use crate::cache::{CachePersistence, CacheSignals};
use crate::error::CachePostResult;
use crate::github::JobOutcome;
use std::fmt;
use tracing::info;

/// What the post step does with the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The pre-job phase disabled caching for this run
    SkipDoNotCache,
    /// The job did not succeed and the workflow asked not to cache failures
    SkipJobFailed,
    /// Hand the paths and key to the persistence collaborator
    Save,
}

impl Decision {
    /// Pure decision function
    pub fn decide(outcome: JobOutcome, signals: &CacheSignals) -> Self {
        if signals.do_not_cache {
            Self::SkipDoNotCache
        } else if signals.do_not_cache_on_workflow_failure && !outcome.succeeded() {
            Self::SkipJobFailed
        } else {
            Self::Save
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipDoNotCache => "skip_do_not_cache",
            Self::SkipJobFailed => "skip_job_failed",
            Self::Save => "save",
        }
    }

    pub fn saves(&self) -> bool {
        matches!(self, Self::Save)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decides whether to save the cache and delegates the save
pub struct CacheDecisionEngine {
    persistence: Box<dyn CachePersistence>,
    decision_log: Option<DecisionLog>,
}

impl CacheDecisionEngine {
    pub fn new(persistence: Box<dyn CachePersistence>) -> Self {
        Self {
            persistence,
            decision_log: None,
        }
    }

    pub fn with_decision_log(mut self, log: DecisionLog) -> Self {
        self.decision_log = Some(log);
        self
    }

    /// Decide and, if saving, call the persistence collaborator exactly once
    ///
    /// Persistence errors are returned unchanged.
    pub async fn run(&self, outcome: JobOutcome, signals: CacheSignals) -> CachePostResult<Decision> {
        let decision = Decision::decide(outcome, &signals);

        match decision {
            Decision::SkipDoNotCache => {
                info!("Skipping cache save: caching was disabled for this run");
            }
            Decision::SkipJobFailed => {
                info!(
                    "Skipping cache save: job {} and doNotCacheOnWorkflowFailure is set",
                    outcome
                );
            }
            Decision::Save => {
                info!(
                    key = %signals.computed_key,
                    cache_hit = %signals.cache_hit,
                    outcome = %outcome,
                    via = self.persistence.name(),
                    "Saving cache ({} path(s))",
                    signals.cached_paths.len()
                );
            }
        }

        let result = if decision.saves() {
            self.persistence
                .save(
                    &signals.cached_paths,
                    &signals.computed_key,
                    &signals.cache_hit,
                )
                .await
        } else {
            Ok(())
        };

        // Recorded after the save so a failed save is logged as failed
        if let Some(log) = &self.decision_log {
            log.record(decision, &signals, result.as_ref().err()).await;
        }

        result?;
        Ok(decision)
    }
}
