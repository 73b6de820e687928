//! Job status resolution
//!
//! A job cannot observe its own final result while it is still running, so
//! the post step asks the platform for the run's state. A non-200 answer is a
//! soft failure: one warning, outcome "not succeeded", execution continues.
//! Transport failures are not absorbed.

use crate::config::StatusCheck;
use crate::error::CachePostResult;
use crate::github::api::{RunConclusion, RunResponse, WorkflowRun, WorkflowRunApi};
use crate::github::RunIdentity;
use std::fmt;
use tracing::{debug, warn};

/// Value of `status` that marks the run as successful
pub const SUCCESS_SENTINEL: &str = "success";

/// Value of `status` once a run has finished and has a conclusion
pub const COMPLETED_STATUS: &str = "completed";

/// Whether the enclosing job is considered successful
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    /// Failed, cancelled, still running, or unknown
    NotSucceeded,
}

impl JobOutcome {
    pub fn from_success(succeeded: bool) -> Self {
        if succeeded {
            Self::Succeeded
        } else {
            Self::NotSucceeded
        }
    }

    pub fn succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::NotSucceeded => write!(f, "not succeeded"),
        }
    }
}

/// Decide success from a workflow run under the given policy
pub fn run_succeeded(run: &WorkflowRun, check: StatusCheck) -> bool {
    let by_status = run.status == SUCCESS_SENTINEL;
    let by_conclusion =
        run.status == COMPLETED_STATUS && run.conclusion == Some(RunConclusion::Success);

    match check {
        StatusCheck::Status => by_status,
        StatusCheck::Conclusion => by_conclusion,
        StatusCheck::Either => by_status || by_conclusion,
    }
}

/// Resolves the outcome of the current job from the platform's run status
pub struct JobStatusResolver<A> {
    api: A,
    check: StatusCheck,
    annotate: bool,
}

impl<A: WorkflowRunApi> JobStatusResolver<A> {
    pub fn new(api: A, check: StatusCheck) -> Self {
        Self {
            api,
            check,
            annotate: false,
        }
    }

    /// Also surface the soft failure as a workflow `::warning::` command
    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Query the run once and report whether the job succeeded
    pub async fn resolve(&self, identity: &RunIdentity) -> CachePostResult<JobOutcome> {
        debug!("jobName={}", identity.job);
        debug!("runId={}", identity.run_id);

        let response = self
            .api
            .get_workflow_run(&identity.repo, identity.run_id)
            .await?;

        let succeeded = match response {
            RunResponse::Found(run) => {
                debug!(
                    conclusion = ?run.conclusion,
                    status = %run.status,
                    id = ?run.id,
                    name = ?run.name,
                    "Fetched workflow run"
                );
                run_succeeded(&run, self.check)
            }
            RunResponse::Unavailable { status } => {
                let message = format!(
                    "Failed to fetch jobs for workflow run {} (HTTP code {})",
                    identity.run_id, status
                );
                warn!("{}", message);
                if self.annotate {
                    println!("::warning::{}", message);
                }
                false
            }
        };

        let outcome = JobOutcome::from_success(succeeded);
        debug!("Job outcome: {}", outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CachePostError;
    use crate::github::RepoSlug;
    use async_trait::async_trait;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeApi {
        response: RunResponse,
        calls: AtomicUsize,
    }

    impl FakeApi {
        fn ok(status: &str, conclusion: Option<RunConclusion>) -> Self {
            Self::with(RunResponse::Found(WorkflowRun {
                id: Some(4242),
                name: Some("CI".to_string()),
                status: status.to_string(),
                conclusion,
            }))
        }

        fn http(status: u16) -> Self {
            Self::with(RunResponse::Unavailable { status })
        }

        fn with(response: RunResponse) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WorkflowRunApi for FakeApi {
        async fn get_workflow_run(
            &self,
            _repo: &RepoSlug,
            _run_id: u64,
        ) -> CachePostResult<RunResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct BrokenNetwork;

    #[async_trait]
    impl WorkflowRunApi for BrokenNetwork {
        async fn get_workflow_run(
            &self,
            _repo: &RepoSlug,
            run_id: u64,
        ) -> CachePostResult<RunResponse> {
            Err(CachePostError::Transport {
                run_id,
                reason: "dns error: failed to lookup address".to_string(),
            })
        }
    }

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn warnings(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| line.contains("WARN"))
                .map(str::to_string)
                .collect()
        }
    }

    fn capture_logs() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    fn identity() -> RunIdentity {
        RunIdentity {
            job: "build".to_string(),
            repo: "octo/widgets".parse().unwrap(),
            run_id: 4242,
        }
    }

    #[tokio::test]
    async fn success_status_resolves_true() {
        let resolver = JobStatusResolver::new(FakeApi::ok("success", None), StatusCheck::Status);
        let outcome = resolver.resolve(&identity()).await.unwrap();
        assert_eq!(outcome, JobOutcome::Succeeded);
        assert_eq!(resolver.api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_statuses_resolve_false() {
        for status in ["queued", "in_progress", "completed", "failure", "Success"] {
            let resolver = JobStatusResolver::new(
                FakeApi::ok(status, Some(RunConclusion::Success)),
                StatusCheck::Status,
            );
            let outcome = resolver.resolve(&identity()).await.unwrap();
            assert_eq!(outcome, JobOutcome::NotSucceeded, "status {status}");
        }
    }

    #[tokio::test]
    async fn non_200_warns_once_and_resolves_false() {
        for code in [401, 403, 404, 500, 502] {
            let (logs, _guard) = capture_logs();
            let resolver = JobStatusResolver::new(FakeApi::http(code), StatusCheck::Status);

            let outcome = resolver.resolve(&identity()).await.unwrap();

            assert_eq!(outcome, JobOutcome::NotSucceeded);
            assert_eq!(resolver.api.calls.load(Ordering::SeqCst), 1);
            let warnings = logs.warnings();
            assert_eq!(warnings.len(), 1, "code {code}: {warnings:?}");
            assert!(warnings[0].contains("4242"));
            assert!(warnings[0].contains(&format!("HTTP code {}", code)));
        }
    }

    #[tokio::test]
    async fn success_emits_no_warning() {
        let (logs, _guard) = capture_logs();
        let resolver = JobStatusResolver::new(FakeApi::ok("success", None), StatusCheck::Status);
        resolver.resolve(&identity()).await.unwrap();
        assert!(logs.warnings().is_empty());
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let resolver = JobStatusResolver::new(BrokenNetwork, StatusCheck::Status);
        let err = resolver.resolve(&identity()).await.unwrap_err();
        assert!(matches!(err, CachePostError::Transport { run_id: 4242, .. }));
    }

    #[test]
    fn conclusion_policy() {
        let completed_ok = WorkflowRun {
            id: None,
            name: None,
            status: "completed".to_string(),
            conclusion: Some(RunConclusion::Success),
        };
        let completed_failed = WorkflowRun {
            conclusion: Some(RunConclusion::Failure),
            ..completed_ok.clone()
        };
        let sentinel = WorkflowRun {
            status: "success".to_string(),
            conclusion: None,
            ..completed_ok.clone()
        };

        assert!(!run_succeeded(&completed_ok, StatusCheck::Status));
        assert!(run_succeeded(&completed_ok, StatusCheck::Conclusion));
        assert!(!run_succeeded(&completed_failed, StatusCheck::Conclusion));
        assert!(!run_succeeded(&sentinel, StatusCheck::Conclusion));
        assert!(run_succeeded(&sentinel, StatusCheck::Either));
        assert!(run_succeeded(&completed_ok, StatusCheck::Either));
        assert!(!run_succeeded(&completed_failed, StatusCheck::Either));
    }
}
