// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote job identity, status and per-branch poll state.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Status values reported by the provider for a model version.
///
/// Serialized in the provider's SCREAMING_SNAKE_CASE spelling so aggregated
/// results read the same way the provider's own responses do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Starting,
    TrainingInProgress,
    TrainingCompleted,
    TrainingFailed,
    Running,
    Stopping,
    Stopped,
    Failed,
    Deleting,
    Deleted,
}

impl JobStatus {
    /// Statuses that end a branch in failure regardless of operation.
    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::TrainingFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Starting => "STARTING",
            JobStatus::TrainingInProgress => "TRAINING_IN_PROGRESS",
            JobStatus::TrainingCompleted => "TRAINING_COMPLETED",
            JobStatus::TrainingFailed => "TRAINING_FAILED",
            JobStatus::Running => "RUNNING",
            JobStatus::Stopping => "STOPPING",
            JobStatus::Stopped => "STOPPED",
            JobStatus::Failed => "FAILED",
            JobStatus::Deleting => "DELETING",
            JobStatus::Deleted => "DELETED",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub name: String,
    pub arn: String,
}

/// A model version as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRef {
    pub name: String,
    pub arn: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_location: Option<String>,
}

/// Identity of one remote job: enough to describe, stop or delete it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub region: String,
    pub project_arn: String,
    pub version_name: String,
    #[serde(rename = "projectVersionArn")]
    pub version_arn: String,
}

impl JobHandle {
    pub fn new(region: &str, project: &ProjectRef, version: &VersionRef) -> Self {
        Self {
            region: region.to_string(),
            project_arn: project.arn.clone(),
            version_name: version.name.clone(),
            version_arn: version.arn.clone(),
        }
    }
}

/// Mutable per-branch state carried between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub handle: JobHandle,
    pub status: Option<JobStatus>,
    pub poll_count: u32,
}

impl PollState {
    pub fn new(handle: JobHandle) -> Self {
        Self {
            handle,
            status: None,
            poll_count: 0,
        }
    }
}

/// What a single describe call told us about a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Status(JobStatus),
    /// The provider no longer knows the job.
    Gone,
    /// The call failed in a way that may succeed on the next poll.
    Transient(String),
}
