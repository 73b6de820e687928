//! GitHub Actions run identity and workflow run status

pub mod api;
pub mod status;

pub use api::{GithubApi, RunConclusion, RunResponse, WorkflowRun, WorkflowRunApi};
pub use status::{JobOutcome, JobStatusResolver};

use crate::env::ActionEnv;
use crate::error::{CachePostError, CachePostResult};
use std::fmt;
use std::str::FromStr;

/// Input carrying the API token
pub const TOKEN_INPUT: &str = "gitHubToken";

/// `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, repo) = s
            .split_once('/')
            .ok_or_else(|| format!("expected owner/repo, got '{}'", s))?;

        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(format!("expected owner/repo, got '{}'", s));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The workflow run this process belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    /// Job id within the workflow, logged only
    pub job: String,
    pub repo: RepoSlug,
    /// Always positive
    pub run_id: u64,
}

impl RunIdentity {
    /// Read and validate the run identity from the runner environment
    pub fn from_env(env: &ActionEnv) -> CachePostResult<Self> {
        let job = env.require("GITHUB_JOB")?.to_string();

        let raw_run_id = env.require("GITHUB_RUN_ID")?;
        let run_id = raw_run_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                CachePostError::env_invalid(
                    "GITHUB_RUN_ID",
                    format!("expected a positive integer, got '{}'", raw_run_id),
                )
            })?;

        let repo = env
            .require("GITHUB_REPOSITORY")?
            .parse::<RepoSlug>()
            .map_err(|reason| CachePostError::env_invalid("GITHUB_REPOSITORY", reason))?;

        Ok(Self { job, repo, run_id })
    }
}

/// Read the API token, preferring the action input over `GITHUB_TOKEN`
pub fn token_from_env(env: &ActionEnv) -> CachePostResult<String> {
    env.input(TOKEN_INPUT)
        .or_else(|| env.get("GITHUB_TOKEN"))
        .map(str::to_string)
        .ok_or_else(|| CachePostError::EnvMissing(ActionEnv::input_var(TOKEN_INPUT)))
}
