use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::traits::RemoteJobClient;
use crate::model::{
    BranchTarget, JobHandle, JobStatus, Observation, ProjectRef, VersionRef, WorkflowKind,
};

/// What RESOLVE learned about the target before SUBMIT runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub project: Option<ProjectRef>,
    pub version: Option<VersionRef>,
}

/// Result of the RESOLVE step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A matching job already exists: skip SUBMIT and poll it.
    Attach(JobHandle),
    /// Nothing to attach to: SUBMIT must run.
    Submit(Resolved),
    /// The target does not exist at all.
    Absent,
}

/// The remote operation a polling state machine drives.
///
/// The same machine runs build, stop and delete; only these hooks differ.
#[async_trait]
pub trait LifecycleOperation: Send + Sync {
    fn kind(&self) -> WorkflowKind;

    async fn resolve(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
    ) -> Result<Resolution, RemoteError>;

    async fn submit(
        &self,
        client: &dyn RemoteJobClient,
        target: &BranchTarget,
        resolved: Resolved,
    ) -> Result<JobHandle, RemoteError>;

    /// Terminal-success predicate evaluated after each poll.
    fn is_success(&self, observation: &Observation) -> bool;

    /// Status reported for a branch that ended in success.
    fn success_status(&self) -> JobStatus;
}
