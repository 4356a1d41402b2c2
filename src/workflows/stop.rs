// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::model::{BranchTarget, JobHandle, JobStatus, Observation, WorkflowKind};
use crate::traits::{LifecycleOperation, RemoteJobClient, Resolution, Resolved};
use crate::workflows::versions::locate_version;

/// Stop a running model version.
///
/// A version already stopping or stopped is attached to, not stopped again.
/// A version that does not exist counts as stopped.
pub struct StopOperation;

#[async_trait]
impl LifecycleOperation for StopOperation {
    fn kind(&self) -> WorkflowKind {
        WorkflowKind::Stop
    }

    async fn resolve(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
    ) -> Result<Resolution, RemoteError> {
        let Some((project, version)) = locate_version(client, target).await? else {
            return Ok(Resolution::Absent);
        };

        match version.status {
            JobStatus::Stopping | JobStatus::Stopped => Ok(Resolution::Attach(JobHandle::new(
                &target.region,
                &project,
                &version,
            ))),
            _ => Ok(Resolution::Submit(Resolved {
                project: Some(project),
                version: Some(version),
            })),
        }
    }

    async fn submit(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
        resolved: Resolved,
    ) -> Result<JobHandle, RemoteError> {
        let (Some(project), Some(version)) = (resolved.project, resolved.version) else {
            return Err(RemoteError::NotFound(format!(
                "version '{}' in {}",
                target.version_name, target.region
            )));
        };
        let handle = JobHandle::new(&target.region, &project, &version);
        client.stop_version(&handle).await?;
        Ok(handle)
    }

    fn is_success(&self, observation: &Observation) -> bool {
        matches!(
            observation,
            Observation::Status(JobStatus::Stopped) | Observation::Gone
        )
    }

    fn success_status(&self) -> JobStatus {
        JobStatus::Stopped
    }
}
