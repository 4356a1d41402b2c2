// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tokio::time::sleep;
use tracing::Instrument;

use crate::config::PollPolicy;
use crate::errors::{FailureCause, RemoteError};
use crate::model::{BranchOutcome, BranchTarget, JobHandle, JobStatus, Observation, PollState};
use crate::observability::messages::branch::{
    BranchFailed, BranchStarted, BranchSucceeded, JobAttached, JobSubmitted, PollObserved,
    RetryScheduled, TransientProviderError,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{LifecycleOperation, RemoteJobClient, Resolution, Resolved};

/// States of one branch.
///
/// ```text
/// RESOLVE ──attach──────────────────────► POLL
///    │                                     │
///    └─► SUBMIT ─► WAIT ─► POLL ─► WAIT ─► POLL ... ─► TERMINAL_SUCCESS
///          │                                      └─► TERMINAL_FAILURE
///          └─(transient)─► BACKOFF ─► RESOLVE
/// ```
///
/// `Backoff` is the wait before RESOLVE is retried after a transient
/// provider error during RESOLVE or SUBMIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    Resolve {
        attempt: u32,
    },
    Submit {
        resolved: Resolved,
        attempt: u32,
    },
    Backoff {
        attempt: u32,
    },
    Wait(PollState),
    Poll(PollState),
    TerminalSuccess {
        handle: Option<JobHandle>,
        status: JobStatus,
        poll_count: u32,
    },
    TerminalFailure {
        handle: Option<JobHandle>,
        last_status: Option<JobStatus>,
        poll_count: u32,
        cause: FailureCause,
    },
}

impl BranchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BranchState::TerminalSuccess { .. } | BranchState::TerminalFailure { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            BranchState::Resolve { .. } => "RESOLVE",
            BranchState::Submit { .. } => "SUBMIT",
            BranchState::Backoff { .. } => "BACKOFF",
            BranchState::Wait(_) => "WAIT",
            BranchState::Poll(_) => "POLL",
            BranchState::TerminalSuccess { .. } => "TERMINAL_SUCCESS",
            BranchState::TerminalFailure { .. } => "TERMINAL_FAILURE",
        }
    }
}

/// Drives one job from RESOLVE to a terminal state.
///
/// The machine owns nothing shared: its client is bound to one region and
/// its poll state lives inside the [`BranchState`] it steps. WAIT and BACKOFF
/// are its only suspension points.
pub struct PollingStateMachine {
    operation: Arc<dyn LifecycleOperation>,
    client: Arc<dyn RemoteJobClient>,
    policy: PollPolicy,
    retry_attempts: u32,
}

impl PollingStateMachine {
    pub fn new(
        operation: Arc<dyn LifecycleOperation>,
        client: Arc<dyn RemoteJobClient>,
        policy: PollPolicy,
        retry_attempts: u32,
    ) -> Self {
        Self {
            operation,
            client,
            policy,
            retry_attempts,
        }
    }

    /// Run the branch to completion. Never fails: every error ends up in the
    /// returned outcome.
    pub async fn run(&self, target: &BranchTarget) -> BranchOutcome {
        let started = BranchStarted {
            workflow: self.operation.kind().as_str(),
            region: &target.region,
            version: &target.version_name,
            max_polls: self.policy.max_polls,
            interval: self.policy.interval,
        };
        started.log();
        let span = started.span("polling_state_machine");

        async {
            let mut state = BranchState::Resolve { attempt: 0 };
            while !state.is_terminal() {
                state = self.step(state, target).await;
            }
            self.finish(state, target)
        }
        .instrument(span)
        .await
    }

    /// Advance by exactly one transition. Terminal states are returned as-is.
    pub async fn step(&self, state: BranchState, target: &BranchTarget) -> BranchState {
        match state {
            BranchState::Resolve { attempt } => self.resolve(target, attempt).await,
            BranchState::Submit { resolved, attempt } => self.submit(target, resolved, attempt).await,
            BranchState::Backoff { attempt } => {
                sleep(self.policy.interval).await;
                BranchState::Resolve { attempt }
            }
            BranchState::Wait(poll) => {
                sleep(self.policy.interval).await;
                BranchState::Poll(poll)
            }
            BranchState::Poll(poll) => self.poll(target, poll).await,
            terminal => terminal,
        }
    }

    /// Terminal classification after a poll, in precedence order: failed
    /// status (or an unexpected disappearance), exhausted budget, success,
    /// otherwise keep waiting.
    pub fn classify(&self, poll: PollState, observation: &Observation) -> BranchState {
        match observation {
            Observation::Status(status) if status.is_failure() => {
                return failure(poll, FailureCause::RemoteFailure);
            }
            Observation::Gone if !self.operation.is_success(observation) => {
                let what = format!("version '{}' in {}", poll.handle.version_name, poll.handle.region);
                return failure(poll, FailureCause::NotFound(what));
            }
            _ => {}
        }

        if poll.poll_count >= self.policy.max_polls {
            let polls = poll.poll_count;
            return failure(poll, FailureCause::Timeout { polls });
        }

        if self.operation.is_success(observation) {
            return BranchState::TerminalSuccess {
                status: poll.status.unwrap_or_else(|| self.operation.success_status()),
                poll_count: poll.poll_count,
                handle: Some(poll.handle),
            };
        }

        BranchState::Wait(poll)
    }

    async fn resolve(&self, target: &BranchTarget, attempt: u32) -> BranchState {
        match self.operation.resolve(self.client.as_ref(), target).await {
            Ok(Resolution::Attach(handle)) => {
                JobAttached {
                    region: &target.region,
                    version: &target.version_name,
                    version_arn: &handle.version_arn,
                }
                .log();
                BranchState::Poll(PollState::new(handle))
            }
            Ok(Resolution::Submit(resolved)) => BranchState::Submit { resolved, attempt },
            Ok(Resolution::Absent) => self.absent(target),
            Err(err) => self.submission_error(target, "resolve", err, attempt),
        }
    }

    async fn submit(&self, target: &BranchTarget, resolved: Resolved, attempt: u32) -> BranchState {
        match self
            .operation
            .submit(self.client.as_ref(), target, resolved)
            .await
        {
            Ok(handle) => {
                JobSubmitted {
                    region: &target.region,
                    version: &target.version_name,
                    version_arn: &handle.version_arn,
                }
                .log();
                BranchState::Wait(PollState::new(handle))
            }
            Err(err) => self.submission_error(target, "submit", err, attempt),
        }
    }

    async fn poll(&self, target: &BranchTarget, mut poll: PollState) -> BranchState {
        let observation = match self.client.describe_version(&poll.handle).await {
            Ok(status) => Observation::Status(status),
            Err(RemoteError::NotFound(_)) => Observation::Gone,
            Err(err) => {
                TransientProviderError {
                    region: &target.region,
                    version: &target.version_name,
                    stage: "poll",
                    error: &err,
                }
                .log();
                Observation::Transient(err.to_string())
            }
        };

        poll.poll_count += 1;
        match &observation {
            Observation::Status(status) => poll.status = Some(*status),
            Observation::Gone => poll.status = Some(JobStatus::Deleted),
            Observation::Transient(_) => {}
        }

        PollObserved {
            region: &target.region,
            version: &target.version_name,
            poll_count: poll.poll_count,
            max_polls: self.policy.max_polls,
            observation: &describe(&observation),
        }
        .log();

        self.classify(poll, &observation)
    }

    fn submission_error(
        &self,
        target: &BranchTarget,
        stage: &str,
        err: RemoteError,
        attempt: u32,
    ) -> BranchState {
        if err.is_not_found() {
            return self.absent(target);
        }

        if err.is_transient() && attempt < self.retry_attempts {
            TransientProviderError {
                region: &target.region,
                version: &target.version_name,
                stage,
                error: &err,
            }
            .log();
            RetryScheduled {
                region: &target.region,
                version: &target.version_name,
                attempt: attempt + 1,
                max_attempts: self.retry_attempts,
                delay: self.policy.interval,
            }
            .log();
            return BranchState::Backoff {
                attempt: attempt + 1,
            };
        }

        BranchState::TerminalFailure {
            handle: None,
            last_status: None,
            poll_count: 0,
            cause: FailureCause::Submission(err),
        }
    }

    // The target does not exist before anything was submitted.
    fn absent(&self, target: &BranchTarget) -> BranchState {
        if self.operation.is_success(&Observation::Gone) {
            BranchState::TerminalSuccess {
                handle: None,
                status: JobStatus::Deleted,
                poll_count: 0,
            }
        } else {
            BranchState::TerminalFailure {
                handle: None,
                last_status: None,
                poll_count: 0,
                cause: FailureCause::NotFound(format!(
                    "version '{}' in {}",
                    target.version_name, target.region
                )),
            }
        }
    }

    fn finish(&self, state: BranchState, target: &BranchTarget) -> BranchOutcome {
        match state {
            BranchState::TerminalSuccess {
                handle,
                status,
                poll_count,
            } => {
                BranchSucceeded {
                    region: &target.region,
                    version: &target.version_name,
                    status: status.as_str(),
                    poll_count,
                }
                .log();
                BranchOutcome {
                    region: target.region.clone(),
                    version_name: target.version_name.clone(),
                    job: handle,
                    status,
                    last_observed: Some(status),
                    poll_count,
                    cause: None,
                }
            }
            BranchState::TerminalFailure {
                handle,
                last_status,
                poll_count,
                cause,
            } => {
                BranchFailed {
                    region: &target.region,
                    version: &target.version_name,
                    cause: &cause,
                    poll_count,
                }
                .log();
                BranchOutcome {
                    region: target.region.clone(),
                    version_name: target.version_name.clone(),
                    job: handle,
                    status: JobStatus::Failed,
                    last_observed: last_status,
                    poll_count,
                    cause: Some(cause),
                }
            }
            other => BranchOutcome {
                region: target.region.clone(),
                version_name: target.version_name.clone(),
                job: None,
                status: JobStatus::Failed,
                last_observed: None,
                poll_count: 0,
                cause: Some(FailureCause::Aborted(format!("stopped in {}", other.name()))),
            },
        }
    }
}

fn failure(poll: PollState, cause: FailureCause) -> BranchState {
    BranchState::TerminalFailure {
        last_status: poll.status,
        poll_count: poll.poll_count,
        handle: Some(poll.handle),
        cause,
    }
}

fn describe(observation: &Observation) -> String {
    match observation {
        Observation::Status(status) => status.to_string(),
        Observation::Gone => "gone".to_string(),
        Observation::Transient(reason) => format!("transient error ({})", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{SimCall, SimulatedProvider};
    use crate::model::{RegionTarget, WorkflowInput};
    use crate::traits::ClientFactory;
    use crate::workflows::{BuildOperation, DeleteOperation, StopOperation};
    use std::time::Duration;

    const REGION: &str = "us-east-1";

    fn build_target() -> BranchTarget {
        let input = WorkflowInput {
            project_name: "Cats".into(),
            version_name: "v1".into(),
            manifest_key: None,
            regions: vec![],
        };
        BranchTarget::for_build(&input, &RegionTarget::new(REGION, "train", "out"))
    }

    fn version_target(version: &str) -> BranchTarget {
        BranchTarget {
            region: REGION.into(),
            project_name: "Cats".into(),
            version_name: version.into(),
            project_arn: None,
            version_arn: None,
            training: None,
        }
    }

    fn machine(
        provider: &SimulatedProvider,
        operation: Arc<dyn LifecycleOperation>,
        interval_secs: u64,
        max_polls: u32,
    ) -> PollingStateMachine {
        let client = provider
            .client_for(&RegionTarget::new(REGION, "train", "out"))
            .unwrap();
        PollingStateMachine::new(
            operation,
            client,
            PollPolicy::new(Duration::from_secs(interval_secs), max_polls),
            2,
        )
    }

    fn handle() -> JobHandle {
        JobHandle {
            region: REGION.into(),
            project_arn: "arn:p".into(),
            version_name: "v1".into(),
            version_arn: "arn:v".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_never_finishing_times_out_exactly_at_budget() {
        let provider = SimulatedProvider::builder().polls_to_complete(1_000).build();
        // 180 minutes every 5 minutes
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert_eq!(outcome.poll_count, 36);
        assert_eq!(outcome.cause, Some(FailureCause::Timeout { polls: 36 }));
        assert_eq!(outcome.status, JobStatus::Failed);
        assert_eq!(outcome.last_observed, Some(JobStatus::TrainingInProgress));
        assert_eq!(provider.calls(REGION).describe, 36);
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_submits_then_completes() {
        let provider = SimulatedProvider::builder().polls_to_complete(3).build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.status, JobStatus::TrainingCompleted);
        assert_eq!(outcome.poll_count, 3);
        assert_eq!(provider.calls(REGION).create_project, 1);
        assert_eq!(provider.calls(REGION).create_version, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_version_is_attached_not_resubmitted() {
        let provider = SimulatedProvider::builder().build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::TrainingCompleted);
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.poll_count, 1);
        assert_eq!(provider.calls(REGION).create_project, 0);
        assert_eq!(provider.calls(REGION).create_version, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_region_fails_on_first_poll() {
        let provider = SimulatedProvider::builder().failing_region(REGION).build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert_eq!(outcome.poll_count, 1);
        assert_eq!(outcome.cause, Some(FailureCause::RemoteFailure));
        assert_eq!(
            outcome.cause.map(|c| c.to_string()).as_deref(),
            Some("DescribeJob returned FAILED")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_describe_errors_count_as_polls() {
        let provider = SimulatedProvider::builder().build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::TrainingInProgress);
        provider.script_describes(
            REGION,
            "Cats",
            "v1",
            vec![
                Err(RemoteError::Transient("throttled".into())),
                Err(RemoteError::Transient("throttled".into())),
                Ok(JobStatus::TrainingCompleted),
            ],
        );
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.poll_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_submit_error_is_retried_after_one_interval() {
        let provider = SimulatedProvider::builder().polls_to_complete(1).build();
        provider.fail_next(REGION, SimCall::CreateVersion, RemoteError::Transient("throttled".into()));
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let started = tokio::time::Instant::now();
        let outcome = machine.run(&build_target()).await;

        assert!(outcome.succeeded());
        assert_eq!(provider.calls(REGION).create_version, 2);
        // one backoff plus one wait before the only poll
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(600) && elapsed < Duration::from_secs(601));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_retries_are_bounded() {
        let provider = SimulatedProvider::builder().build();
        for _ in 0..3 {
            provider.fail_next(REGION, SimCall::CreateProject, RemoteError::Transient("throttled".into()));
        }
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);

        let outcome = machine.run(&build_target()).await;

        assert!(matches!(
            outcome.cause,
            Some(FailureCause::Submission(RemoteError::Transient(_)))
        ));
        assert_eq!(outcome.poll_count, 0);
        assert_eq!(provider.calls(REGION).create_project, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_absent_version_succeeds() {
        let provider = SimulatedProvider::builder().build();
        provider.seed_project(REGION, "Cats");
        let machine = machine(&provider, Arc::new(DeleteOperation), 5, 50);

        let outcome = machine.run(&version_target("gone")).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.status, JobStatus::Deleted);
        assert_eq!(outcome.poll_count, 0);
        assert_eq!(provider.calls(REGION).delete_version, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_completes_when_version_disappears() {
        let provider = SimulatedProvider::builder().polls_to_complete(2).build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::TrainingCompleted);
        let machine = machine(&provider, Arc::new(DeleteOperation), 5, 50);

        let outcome = machine.run(&version_target("v1")).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.status, JobStatus::Deleted);
        assert_eq!(outcome.poll_count, 2);
        assert_eq!(provider.version_status(REGION, "Cats", "v1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_attaches_to_stopping_version() {
        let provider = SimulatedProvider::builder().polls_to_complete(2).build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::Stopping);
        let machine = machine(&provider, Arc::new(StopOperation), 300, 50);

        let outcome = machine.run(&version_target("v1")).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.status, JobStatus::Stopped);
        assert_eq!(provider.calls(REGION).stop, 0);
    }

    #[test]
    fn test_timeout_takes_precedence_over_success() {
        let provider = SimulatedProvider::builder().build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 3);
        let poll = PollState {
            handle: handle(),
            status: Some(JobStatus::TrainingCompleted),
            poll_count: 3,
        };

        let next = machine.classify(poll, &Observation::Status(JobStatus::TrainingCompleted));

        assert!(matches!(
            next,
            BranchState::TerminalFailure {
                cause: FailureCause::Timeout { polls: 3 },
                ..
            }
        ));
    }

    #[test]
    fn test_failed_status_takes_precedence_over_timeout() {
        let provider = SimulatedProvider::builder().build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 3);
        let poll = PollState {
            handle: handle(),
            status: Some(JobStatus::Failed),
            poll_count: 3,
        };

        let next = machine.classify(poll, &Observation::Status(JobStatus::Failed));

        assert!(matches!(
            next,
            BranchState::TerminalFailure {
                cause: FailureCause::RemoteFailure,
                ..
            }
        ));
    }

    #[test]
    fn test_build_job_disappearing_is_a_failure() {
        let provider = SimulatedProvider::builder().build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);
        let poll = PollState {
            handle: handle(),
            status: Some(JobStatus::Deleted),
            poll_count: 1,
        };

        let next = machine.classify(poll, &Observation::Gone);

        assert!(matches!(
            next,
            BranchState::TerminalFailure {
                cause: FailureCause::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_still_running_loops_to_wait() {
        let provider = SimulatedProvider::builder().build();
        let machine = machine(&provider, Arc::new(BuildOperation), 300, 36);
        let poll = PollState {
            handle: handle(),
            status: Some(JobStatus::TrainingInProgress),
            poll_count: 5,
        };

        let next = machine.classify(poll.clone(), &Observation::Transient("throttled".into()));

        assert_eq!(next, BranchState::Wait(poll));
        assert_eq!(next.name(), "WAIT");
    }
}
