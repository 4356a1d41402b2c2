use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::RemoteError;
use crate::model::{JobHandle, JobStatus, ProjectRef, RegionTarget, TrainingSpec, VersionRef};

/// One page of a listing plus the token for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Capability wrapping the remote training provider, bound to one region.
///
/// Listing is exposed as page primitives; the name lookups walk pages one at
/// a time and stop at the first match, so an unbounded listing never has to
/// be held in memory.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    fn region(&self) -> &str;

    async fn list_projects(&self, next_token: Option<String>) -> Result<Page<ProjectRef>, RemoteError>;

    async fn list_versions(
        &self,
        project: &ProjectRef,
        next_token: Option<String>,
    ) -> Result<Page<VersionRef>, RemoteError>;

    /// Fails with `AlreadyExists` when the name is taken.
    async fn create_project(&self, name: &str) -> Result<ProjectRef, RemoteError>;

    /// Returns immediately; training happens out of process.
    async fn create_version(
        &self,
        project: &ProjectRef,
        version_name: &str,
        training: &TrainingSpec,
    ) -> Result<VersionRef, RemoteError>;

    async fn describe_version(&self, handle: &JobHandle) -> Result<JobStatus, RemoteError>;

    async fn stop_version(&self, handle: &JobHandle) -> Result<(), RemoteError>;

    async fn delete_version(&self, handle: &JobHandle) -> Result<(), RemoteError>;

    async fn delete_project(&self, project: &ProjectRef) -> Result<(), RemoteError>;

    async fn find_project_by_name(&self, name: &str) -> Result<Option<ProjectRef>, RemoteError> {
        let mut token = None;
        loop {
            let page = self.list_projects(token).await?;
            if let Some(found) = page.items.into_iter().find(|p| p.name == name) {
                return Ok(Some(found));
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(None),
            }
        }
    }

    async fn find_version_by_name(
        &self,
        project: &ProjectRef,
        name: &str,
    ) -> Result<Option<VersionRef>, RemoteError> {
        let mut token = None;
        loop {
            let page = self.list_versions(project, token).await?;
            if let Some(found) = page.items.into_iter().find(|v| v.name == name) {
                return Ok(Some(found));
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(None),
            }
        }
    }
}

/// Hands out a client bound to one region. Each branch gets its own.
pub trait ClientFactory: Send + Sync {
    fn client_for(&self, target: &RegionTarget) -> Result<Arc<dyn RemoteJobClient>, RemoteError>;
}
