// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::PollPolicy;
use crate::engine::PollingStateMachine;
use crate::errors::RemoteError;
use crate::model::{
    BranchTarget, JobHandle, JobStatus, Observation, ProjectRef, RegionResult, RegionTarget,
    VersionRef, WorkflowInput, WorkflowKind,
};
use crate::observability::messages::branch::ReusedVersionMismatch;
use crate::observability::messages::StructuredLog;
use crate::traits::{LifecycleOperation, RegionWorkflow, RemoteJobClient, Resolution, Resolved};

/// Train a model version.
///
/// RESOLVE attaches to a version of the same name whatever its status, so
/// re-running a build converges on the existing job instead of creating a
/// second one. A version reached through a concurrent run between RESOLVE
/// and SUBMIT is attached the same way.
pub struct BuildOperation;

#[async_trait]
impl LifecycleOperation for BuildOperation {
    fn kind(&self) -> WorkflowKind {
        WorkflowKind::Build
    }

    async fn resolve(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
    ) -> Result<Resolution, RemoteError> {
        let Some(project) = client.find_project_by_name(&target.project_name).await? else {
            return Ok(Resolution::Submit(Resolved::default()));
        };

        match client
            .find_version_by_name(&project, &target.version_name)
            .await?
        {
            Some(version) => {
                warn_on_output_drift(target, &version);
                Ok(Resolution::Attach(JobHandle::new(&target.region, &project, &version)))
            }
            None => Ok(Resolution::Submit(Resolved {
                project: Some(project),
                version: None,
            })),
        }
    }

    async fn submit(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
        resolved: Resolved,
    ) -> Result<JobHandle, RemoteError> {
        let training = target.training.as_ref().ok_or_else(|| {
            RemoteError::Provider(format!("no training data location for {}", target.region))
        })?;

        let project = match resolved.project {
            Some(project) => project,
            None => create_or_find_project(client, &target.project_name).await?,
        };

        let version = match client
            .create_version(&project, &target.version_name, training)
            .await
        {
            Ok(version) => version,
            Err(RemoteError::AlreadyExists(_)) => client
                .find_version_by_name(&project, &target.version_name)
                .await?
                .ok_or_else(|| not_listed_yet("version", &target.version_name))?,
            Err(err) => return Err(err),
        };

        Ok(JobHandle::new(&target.region, &project, &version))
    }

    fn is_success(&self, observation: &Observation) -> bool {
        matches!(observation, Observation::Status(JobStatus::TrainingCompleted))
    }

    fn success_status(&self) -> JobStatus {
        JobStatus::TrainingCompleted
    }
}

// A project that appeared since RESOLVE is reused, not an error.
async fn create_or_find_project(
    client: &dyn RemoteJobClient,
    name: &str,
) -> Result<ProjectRef, RemoteError> {
    match client.create_project(name).await {
        Ok(project) => Ok(project),
        Err(RemoteError::AlreadyExists(_)) => client
            .find_project_by_name(name)
            .await?
            .ok_or_else(|| not_listed_yet("project", name)),
        Err(err) => Err(err),
    }
}

// Creation said "exists" but the listing does not show it yet: retry later.
fn not_listed_yet(kind: &str, name: &str) -> RemoteError {
    RemoteError::Transient(format!("{} '{}' exists but is not listed yet", kind, name))
}

fn warn_on_output_drift(target: &BranchTarget, version: &VersionRef) {
    let requested = target.training.as_ref().map(|t| t.output_location.as_str());
    if let (Some(requested), Some(existing)) = (requested, version.output_location.as_deref()) {
        if requested != existing {
            ReusedVersionMismatch {
                region: &target.region,
                version: &target.version_name,
                requested_output: requested,
                existing_output: existing,
            }
            .log();
        }
    }
}

/// One build branch per region.
pub struct BuildWorkflow {
    input: WorkflowInput,
    policy: PollPolicy,
    retry_attempts: u32,
}

impl BuildWorkflow {
    pub fn new(input: WorkflowInput, policy: PollPolicy, retry_attempts: u32) -> Self {
        Self {
            input,
            policy,
            retry_attempts,
        }
    }
}

#[async_trait]
impl RegionWorkflow for BuildWorkflow {
    fn kind(&self) -> WorkflowKind {
        WorkflowKind::Build
    }

    fn project_name(&self) -> &str {
        &self.input.project_name
    }

    fn subject(&self, prefix: &str) -> String {
        format!(
            "{} Model Build Result for Project: {}, Version: {}",
            prefix, self.input.project_name, self.input.version_name
        )
    }

    async fn run_region(&self, target: RegionTarget, client: Arc<dyn RemoteJobClient>) -> RegionResult {
        let branch = BranchTarget::for_build(&self.input, &target);
        let machine = PollingStateMachine::new(
            Arc::new(BuildOperation),
            client,
            self.policy,
            self.retry_attempts,
        );
        RegionResult::from_branch(machine.run(&branch).await)
    }
}
