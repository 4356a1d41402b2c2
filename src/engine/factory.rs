// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::engine::FanOutCoordinator;
use crate::model::WorkflowRequest;
use crate::traits::RegionWorkflow;
use crate::workflows::{BuildWorkflow, VersionsWorkflow};

/// Factory for creating the workflow variant a request asks for
pub struct WorkflowFactory;

impl WorkflowFactory {
    /// Create a region workflow with the policy configured for its variant
    pub fn from_request(
        cfg: &Config,
        request: &WorkflowRequest,
        coordinator: FanOutCoordinator,
    ) -> Arc<dyn RegionWorkflow> {
        let policy = cfg.policy(request.kind());
        let retry_attempts = cfg.retry_attempts();

        match request {
            WorkflowRequest::Build(input) => {
                Arc::new(BuildWorkflow::new(input.clone(), policy, retry_attempts))
            }
            WorkflowRequest::Stop(input) => Arc::new(VersionsWorkflow::stop(
                input.clone(),
                policy,
                retry_attempts,
                coordinator,
            )),
            WorkflowRequest::Delete(input) => Arc::new(VersionsWorkflow::delete(
                input.clone(),
                policy,
                retry_attempts,
                coordinator,
            )),
        }
    }
}
