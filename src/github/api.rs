//! GitHub REST client for the "get a workflow run" endpoint
//!
//! Provides a trait so the status resolver can be driven by a fake in tests.

use crate::config::GithubConfig;
use crate::error::{CachePostError, CachePostResult};
use crate::github::RepoSlug;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Final result of a completed workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Neutral,
    Skipped,
    Success,
    Cancelled,
    TimedOut,
    ActionRequired,
    Failure,
    /// Any value added by the platform after this was written
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Neutral => "neutral",
            Self::Skipped => "skipped",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// The fields of a workflow run the post step looks at
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
}

/// Outcome of a single workflow run request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResponse {
    /// HTTP 200 with a parsed body
    Found(WorkflowRun),
    /// Any other HTTP status
    Unavailable { status: u16 },
}

/// Read access to workflow runs
#[async_trait]
pub trait WorkflowRunApi: Send + Sync {
    /// Fetch one workflow run. Exactly one request is made per call.
    async fn get_workflow_run(&self, repo: &RepoSlug, run_id: u64)
        -> CachePostResult<RunResponse>;
}

/// Blocking `ureq` client run on tokio's blocking pool
pub struct GithubApi {
    agent: ureq::Agent,
    api_url: String,
    user_agent: String,
    token: String,
}

impl GithubApi {
    /// Create a client for the configured API endpoint
    pub fn new(config: &GithubConfig, token: String) -> Self {
        // Non-2xx responses are data here, not errors
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            token,
        }
    }

    /// URL of the workflow run resource
    pub fn run_url(&self, repo: &RepoSlug, run_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/actions/runs/{}",
            self.api_url, repo.owner, repo.repo, run_id
        )
    }

    fn fetch(
        agent: ureq::Agent,
        url: String,
        user_agent: String,
        token: String,
        run_id: u64,
    ) -> CachePostResult<RunResponse> {
        let transport = |e: ureq::Error| CachePostError::Transport {
            run_id,
            reason: e.to_string(),
        };

        let mut response = agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", token))
            .header("User-Agent", user_agent)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .call()
            .map_err(transport)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(RunResponse::Unavailable { status });
        }

        let body = response.body_mut().read_to_string().map_err(transport)?;
        let run = serde_json::from_str::<WorkflowRun>(&body)
            .map_err(|source| CachePostError::RunResponse { run_id, source })?;

        Ok(RunResponse::Found(run))
    }
}

#[async_trait]
impl WorkflowRunApi for GithubApi {
    async fn get_workflow_run(
        &self,
        repo: &RepoSlug,
        run_id: u64,
    ) -> CachePostResult<RunResponse> {
        let url = self.run_url(repo, run_id);
        debug!("GET {}", url);

        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let token = self.token.clone();

        tokio::task::spawn_blocking(move || Self::fetch(agent, url, user_agent, token, run_id))
            .await
            .map_err(|e| CachePostError::Internal(format!("workflow run request panicked: {}", e)))?
    }
}
