use async_trait::async_trait;
use std::sync::Arc;

use crate::model::{RegionResult, RegionTarget, WorkflowKind};
use crate::traits::RemoteJobClient;

/// One workflow variant as seen by the fan-out coordinator: a unit of work
/// per region that always ends in a [`RegionResult`].
#[async_trait]
pub trait RegionWorkflow: Send + Sync {
    fn kind(&self) -> WorkflowKind;

    fn project_name(&self) -> &str;

    /// Notification subject, prefixed with the configured prefix.
    fn subject(&self, prefix: &str) -> String;

    async fn run_region(&self, target: RegionTarget, client: Arc<dyn RemoteJobClient>) -> RegionResult;
}
