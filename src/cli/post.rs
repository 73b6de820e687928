//! The post-job step: gather state, resolve the job outcome, decide

use crate::audit::DecisionLog;
use crate::cache::{CachePersistence, CacheSignals, CommandPersistence, DryRunPersistence};
use crate::config::{CacheConfig, Config};
use crate::engine::{CacheDecisionEngine, Decision};
use crate::env::ActionEnv;
use crate::error::CachePostResult;
use crate::github::{self, GithubApi, JobStatusResolver, RunIdentity, WorkflowRunApi};
use std::path::PathBuf;
use tracing::debug;

/// Options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub dry_run: bool,
    pub decision_log: Option<PathBuf>,
}

/// Everything read from the environment, validated, before any network I/O
pub struct PostJob {
    pub identity: RunIdentity,
    pub signals: CacheSignals,
    token: String,
    persistence: Box<dyn CachePersistence>,
    decision_log: Option<PathBuf>,
}

impl PostJob {
    /// Read and validate all inputs. Fails on the first missing or malformed
    /// value.
    pub fn prepare(options: &PostOptions, config: &Config, env: &ActionEnv) -> CachePostResult<Self> {
        let identity = RunIdentity::from_env(env)?;
        let token = github::token_from_env(env)?;
        let signals = CacheSignals::from_env(env, &config.cache)?;
        let persistence = select_persistence(options.dry_run, &config.cache, &signals)?;

        debug!(
            repo = %identity.repo,
            run_id = identity.run_id,
            key = %signals.computed_key,
            persistence = persistence.name(),
            "Post-job state loaded"
        );

        Ok(Self {
            identity,
            signals,
            token,
            persistence,
            decision_log: options
                .decision_log
                .clone()
                .or_else(|| config.general.decision_log.clone()),
        })
    }

    /// Resolve the job outcome with `resolver`, then decide
    pub async fn run<A: WorkflowRunApi>(self, resolver: &JobStatusResolver<A>) -> CachePostResult<Decision> {
        let outcome = resolver.resolve(&self.identity).await?;

        let mut engine = CacheDecisionEngine::new(self.persistence);
        if let Some(path) = self.decision_log {
            engine = engine.with_decision_log(DecisionLog::new(path, self.identity.run_id));
        }

        engine.run(outcome, self.signals).await
    }
}

/// Pick the persistence collaborator
///
/// A save command is only required when a save can actually happen.
fn select_persistence(
    dry_run: bool,
    config: &CacheConfig,
    signals: &CacheSignals,
) -> CachePostResult<Box<dyn CachePersistence>> {
    if dry_run || (signals.do_not_cache && config.save_command.is_empty()) {
        return Ok(Box::new(DryRunPersistence));
    }

    Ok(Box::new(CommandPersistence::from_command(&config.save_command)?))
}

/// Execute the post-job step against the GitHub API
pub async fn execute(options: &PostOptions, config: &Config, env: &ActionEnv) -> CachePostResult<Decision> {
    let job = PostJob::prepare(options, config, env)?;
    let api = GithubApi::new(&config.github, job.token.clone());
    let resolver = JobStatusResolver::new(api, config.cache.status_check)
        .with_annotations(env.is_github_actions());

    job.run(&resolver).await
}
