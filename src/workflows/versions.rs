// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stop and delete: one region branch fans out again over the versions it
//! acts on, and folds their outcomes into a single region entry.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::time::sleep;

use crate::config::PollPolicy;
use crate::engine::{FanOutCoordinator, PollingStateMachine};
use crate::errors::{FailureCause, RemoteError};
use crate::model::{
    BranchOutcome, BranchTarget, JobHandle, JobStatus, ProjectRef, RegionResult, RegionTarget, VersionRef,
    VersionsInput, WorkflowKind,
};
use crate::traits::{LifecycleOperation, RegionWorkflow, RemoteJobClient};
use crate::workflows::inventory::list_all_versions;
use crate::workflows::{DeleteOperation, StopOperation};

/// Find the project and version a stop/delete branch acts on.
///
/// A known version identifier is used as-is: its status comes from one
/// describe call instead of a listing. `Ok(None)` when either is missing,
/// including identifiers the provider no longer knows.
pub(crate) async fn locate_version(
    client: &dyn RemoteJobClient,
    target: &BranchTarget,
) -> Result<Option<(ProjectRef, VersionRef)>, RemoteError> {
    let project = match &target.project_arn {
        Some(arn) => ProjectRef {
            name: target.project_name.clone(),
            arn: arn.clone(),
        },
        None => match client.find_project_by_name(&target.project_name).await? {
            Some(project) => project,
            None => return Ok(None),
        },
    };

    let found = match &target.version_arn {
        Some(arn) => describe_known_version(client, target, &project, arn).await,
        None => {
            client
                .find_version_by_name(&project, &target.version_name)
                .await
        }
    };

    match found {
        Ok(found) => Ok(found.map(|version| (project, version))),
        Err(RemoteError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn describe_known_version(
    client: &dyn RemoteJobClient,
    target: &BranchTarget,
    project: &ProjectRef,
    version_arn: &str,
) -> Result<Option<VersionRef>, RemoteError> {
    let mut version = VersionRef {
        name: target.version_name.clone(),
        arn: version_arn.to_string(),
        status: JobStatus::Pending,
        output_location: None,
    };
    version.status = client
        .describe_version(&JobHandle::new(&target.region, project, &version))
        .await?;
    Ok(Some(version))
}

/// Stop or delete a set of versions of one project in every region.
pub struct VersionsWorkflow {
    operation: Arc<dyn LifecycleOperation>,
    input: VersionsInput,
    project_name: String,
    policy: PollPolicy,
    retry_attempts: u32,
    coordinator: FanOutCoordinator,
}

impl VersionsWorkflow {
    pub fn stop(
        input: VersionsInput,
        policy: PollPolicy,
        retry_attempts: u32,
        coordinator: FanOutCoordinator,
    ) -> Self {
        Self::new(Arc::new(StopOperation), input, policy, retry_attempts, coordinator)
    }

    pub fn delete(
        input: VersionsInput,
        policy: PollPolicy,
        retry_attempts: u32,
        coordinator: FanOutCoordinator,
    ) -> Self {
        Self::new(Arc::new(DeleteOperation), input, policy, retry_attempts, coordinator)
    }

    fn new(
        operation: Arc<dyn LifecycleOperation>,
        input: VersionsInput,
        policy: PollPolicy,
        retry_attempts: u32,
        coordinator: FanOutCoordinator,
    ) -> Self {
        let project_name = input.effective_project_name().unwrap_or_default();
        Self {
            operation,
            input,
            project_name,
            policy,
            retry_attempts,
            coordinator,
        }
    }

    fn deletes_project(&self) -> bool {
        self.operation.kind() == WorkflowKind::Delete && self.input.delete_project
    }

    fn versions_label(&self) -> String {
        let names = self.input.effective_version_names();
        if names.is_empty() {
            "all".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Retry a listing call on transient errors, one poll interval apart.
    async fn with_retries<T, F, Fut>(&self, mut call: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(err) if err.is_transient() && attempt < self.retry_attempts => {
                    attempt += 1;
                    sleep(self.policy.interval).await;
                }
                other => return other,
            }
        }
    }

    async fn find_project(&self, client: &dyn RemoteJobClient) -> Result<Option<ProjectRef>, RemoteError> {
        if let Some(arn) = self.input.project_arn_in(client.region()) {
            return Ok(Some(ProjectRef {
                name: self.project_name.clone(),
                arn: arn.to_string(),
            }));
        }
        let name = self.project_name.as_str();
        self.with_retries(|| client.find_project_by_name(name)).await
    }

    /// Versions this region acts on: the named ones, or every version of the
    /// project when a whole project is being deleted.
    async fn version_names_in(&self, client: &dyn RemoteJobClient) -> Result<Vec<String>, RemoteError> {
        let named = self.input.effective_version_names();
        if !named.is_empty() || !self.deletes_project() {
            return Ok(named);
        }

        let Some(project) = self.find_project(client).await? else {
            return Ok(Vec::new());
        };
        let versions = match self.with_retries(|| list_all_versions(client, &project)).await {
            Ok(versions) => versions,
            Err(RemoteError::NotFound(_)) => Vec::new(),
            Err(err) => return Err(err),
        };
        Ok(versions.into_iter().map(|v| v.name).collect())
    }

    async fn delete_project_in(&self, client: &dyn RemoteJobClient) -> Result<(), RemoteError> {
        let Some(project) = self.find_project(client).await? else {
            return Ok(());
        };
        match self.with_retries(|| client.delete_project(&project)).await {
            Err(RemoteError::NotFound(_)) => Ok(()),
            other => other,
        }
    }
}

#[async_trait]
impl RegionWorkflow for VersionsWorkflow {
    fn kind(&self) -> WorkflowKind {
        self.operation.kind()
    }

    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn subject(&self, prefix: &str) -> String {
        match self.operation.kind() {
            WorkflowKind::Stop => format!(
                "{} Stop Version Result for Project: {}, Versions: {}",
                prefix,
                self.project_name,
                self.versions_label()
            ),
            _ => format!(
                "{} Model Delete Result for Project: {}, Versions: {}",
                prefix,
                self.project_name,
                self.versions_label()
            ),
        }
    }

    async fn run_region(&self, target: RegionTarget, client: Arc<dyn RemoteJobClient>) -> RegionResult {
        let names = match self.version_names_in(client.as_ref()).await {
            Ok(names) => names,
            Err(err) => return RegionResult::failed(&target.region, &FailureCause::Submission(err)),
        };

        let branches: Vec<BranchTarget> = names
            .iter()
            .map(|name| BranchTarget::for_version(&self.input, &target.region, name))
            .collect();

        let operation = Arc::clone(&self.operation);
        let branch_client = Arc::clone(&client);
        let policy = self.policy;
        let retry_attempts = self.retry_attempts;
        let outcomes = self
            .coordinator
            .fan_out(
                branches,
                move |branch: BranchTarget| {
                    let machine = PollingStateMachine::new(
                        Arc::clone(&operation),
                        Arc::clone(&branch_client),
                        policy,
                        retry_attempts,
                    );
                    async move { machine.run(&branch).await }
                },
                |index, reason| BranchOutcome {
                    region: target.region.clone(),
                    version_name: names[index].clone(),
                    job: None,
                    status: JobStatus::Failed,
                    last_observed: None,
                    poll_count: 0,
                    cause: Some(FailureCause::Aborted(reason.to_string())),
                },
            )
            .await;

        let mut result =
            RegionResult::from_versions(&target.region, self.operation.success_status(), outcomes);

        if self.deletes_project() && result.succeeded() {
            if let Err(err) = self.delete_project_in(client.as_ref()).await {
                result.status = JobStatus::Failed;
                result.cause = Some(format!("project {}: {}", self.project_name, err));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{SimCall, SimulatedProvider};
    use crate::traits::ClientFactory;
    use std::time::Duration;

    const REGION: &str = "us-east-1";

    fn region() -> RegionTarget {
        RegionTarget::new(REGION, "train", "out")
    }

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(5), 50)
    }

    fn input(versions: &[&str]) -> VersionsInput {
        VersionsInput {
            project_name: "Cats".into(),
            version_names: versions.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_fans_out_over_versions_in_input_order() {
        let provider = SimulatedProvider::builder().polls_to_complete(2).build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::Running);
        provider.seed_version(REGION, "Cats", "v2", JobStatus::Running);
        let workflow = VersionsWorkflow::stop(input(&["v2", "v1"]), policy(), 2, FanOutCoordinator::default());

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert!(result.succeeded());
        assert_eq!(result.status, JobStatus::Stopped);
        let names: Vec<_> = result.versions.iter().map(|v| v.version_name.as_str()).collect();
        assert_eq!(names, vec!["v2", "v1"]);
        assert_eq!(provider.calls(REGION).stop, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_version_fails_the_region_only_for_that_version() {
        let provider = SimulatedProvider::builder().polls_to_complete(2).build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::Running);
        provider.seed_version(REGION, "Cats", "v2", JobStatus::Running);
        provider.script_describes(REGION, "Cats", "v2", vec![Ok(JobStatus::Failed)]);
        let workflow = VersionsWorkflow::stop(input(&["v1", "v2"]), policy(), 2, FanOutCoordinator::default());

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert_eq!(result.status, JobStatus::Failed);
        assert_eq!(
            result.cause.as_deref(),
            Some("version v2: DescribeJob returned FAILED")
        );
        assert_eq!(result.versions[0].status, JobStatus::Stopped);
        assert_eq!(result.versions[1].status, JobStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_project_removes_every_version_then_the_project() {
        let provider = SimulatedProvider::builder().polls_to_complete(1).build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::TrainingCompleted);
        provider.seed_version(REGION, "Cats", "v2", JobStatus::Stopped);
        let workflow = VersionsWorkflow::delete(
            VersionsInput {
                project_name: "Cats".into(),
                delete_project: true,
                ..Default::default()
            },
            policy(),
            2,
            FanOutCoordinator::default(),
        );

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert!(result.succeeded(), "{:?}", result.cause);
        assert_eq!(result.versions.len(), 2);
        assert!(!provider.has_project(REGION, "Cats"));
        assert_eq!(provider.calls(REGION).delete_project, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_missing_project_succeeds_without_calls() {
        let provider = SimulatedProvider::builder().build();
        let workflow = VersionsWorkflow::delete(
            VersionsInput {
                project_name: "Cats".into(),
                delete_project: true,
                ..Default::default()
            },
            policy(),
            2,
            FanOutCoordinator::default(),
        );

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert!(result.succeeded());
        assert!(result.versions.is_empty());
        assert_eq!(provider.calls(REGION).delete_project, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_failure_fails_the_region() {
        let provider = SimulatedProvider::builder().build();
        provider.seed_version(REGION, "Cats", "v1", JobStatus::Stopped);
        provider.fail_next(REGION, SimCall::ListProjects, RemoteError::Provider("denied".into()));
        let workflow = VersionsWorkflow::delete(
            VersionsInput {
                project_name: "Cats".into(),
                delete_project: true,
                ..Default::default()
            },
            policy(),
            2,
            FanOutCoordinator::default(),
        );

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.cause.unwrap().contains("denied"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_version_identifier_is_used_without_listing_versions() {
        let provider = SimulatedProvider::builder().polls_to_complete(1).build();
        let arn = provider.seed_version(REGION, "Cats", "v1", JobStatus::Running);
        let workflow = VersionsWorkflow::stop(
            VersionsInput {
                project_version_arns: vec![arn],
                ..Default::default()
            },
            policy(),
            2,
            FanOutCoordinator::default(),
        );

        let result = workflow
            .run_region(region(), provider.client_for(&region()).unwrap())
            .await;

        assert!(result.succeeded(), "{:?}", result.cause);
        assert_eq!(provider.calls(REGION).list_versions, 0);
        assert_eq!(provider.calls(REGION).stop, 1);
    }

    #[tokio::test]
    async fn test_unknown_version_identifier_is_absent() {
        let provider = SimulatedProvider::builder().build();
        provider.seed_project(REGION, "Cats");
        let target = BranchTarget {
            region: REGION.into(),
            project_name: "Cats".into(),
            version_name: "v1".into(),
            project_arn: None,
            version_arn: Some(
                "arn:aws:rekognition:us-east-1:111964674713:project/Cats/version/v1/1".into(),
            ),
            training: None,
        };

        let located = locate_version(provider.client_for(&region()).unwrap().as_ref(), &target)
            .await
            .unwrap();

        assert_eq!(located, None);
        assert_eq!(provider.calls(REGION).list_versions, 0);
    }

    #[test]
    fn test_subjects() {
        let stop = VersionsWorkflow::stop(input(&["v1", "v2"]), policy(), 2, FanOutCoordinator::default());
        assert_eq!(
            stop.subject("GCL"),
            "GCL Stop Version Result for Project: Cats, Versions: v1, v2"
        );

        let delete = VersionsWorkflow::delete(
            VersionsInput {
                project_name: "Cats".into(),
                delete_project: true,
                ..Default::default()
            },
            policy(),
            2,
            FanOutCoordinator::default(),
        );
        assert_eq!(
            delete.subject("GCL"),
            "GCL Model Delete Result for Project: Cats, Versions: all"
        );
    }
}
