// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::model::{BranchTarget, JobHandle, JobStatus, Observation, WorkflowKind};
use crate::traits::{LifecycleOperation, RemoteJobClient, Resolution, Resolved};
use crate::workflows::versions::locate_version;

/// Delete a model version. Done once the provider no longer knows it.
pub struct DeleteOperation;

#[async_trait]
impl LifecycleOperation for DeleteOperation {
    fn kind(&self) -> WorkflowKind {
        WorkflowKind::Delete
    }

    async fn resolve(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
    ) -> Result<Resolution, RemoteError> {
        let Some((project, version)) = locate_version(client, target).await? else {
            return Ok(Resolution::Absent);
        };

        if version.status == JobStatus::Deleting {
            return Ok(Resolution::Attach(JobHandle::new(
                &target.region,
                &project,
                &version,
            )));
        }

        Ok(Resolution::Submit(Resolved {
            project: Some(project),
            version: Some(version),
        }))
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
        client.delete_version(&handle).await?;
        Ok(handle)
    }

    fn is_success(&self, observation: &Observation) -> bool {
        matches!(
            observation,
            Observation::Gone | Observation::Status(JobStatus::Deleted)
        )
    }

    fn success_status(&self) -> JobStatus {
        JobStatus::Deleted
    }
}
