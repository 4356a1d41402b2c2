// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Branch outcomes and the aggregated result built from them.

use crate::errors::FailureCause;
use crate::model::input::WorkflowKind;
use crate::model::job::{JobHandle, JobStatus};
use serde::{Deserialize, Serialize};

/// How one polling state machine ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    pub region: String,
    pub version_name: String,
    pub job: Option<JobHandle>,
    /// The operation's success status, or `FAILED`.
    pub status: JobStatus,
    /// Last status the provider reported, if any poll succeeded.
    pub last_observed: Option<JobStatus>,
    pub poll_count: u32,
    pub cause: Option<FailureCause>,
}

impl BranchOutcome {
    pub fn succeeded(&self) -> bool {
        self.cause.is_none()
    }
}

/// Outcome of one version inside a region that fanned out over several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    pub version_name: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_version_arn: Option<String>,
    pub poll_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl From<BranchOutcome> for VersionResult {
    fn from(outcome: BranchOutcome) -> Self {
        Self {
            version_name: outcome.version_name,
            status: outcome.status,
            project_version_arn: outcome.job.map(|j| j.version_arn),
            poll_count: outcome.poll_count,
            cause: outcome.cause.map(|c| c.to_string()),
        }
    }
}

/// One entry of the aggregated result: the outcome of one region branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResult {
    pub region: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobHandle>,
    /// Polls spent by the branch; the longest version for nested branches.
    pub poll_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<VersionResult>,
}

impl RegionResult {
    pub fn from_branch(outcome: BranchOutcome) -> Self {
        Self {
            region: outcome.region,
            status: outcome.status,
            job: outcome.job,
            poll_count: outcome.poll_count,
            cause: outcome.cause.map(|c| c.to_string()),
            versions: Vec::new(),
        }
    }

    /// Fold the nested version branches of one region.
    ///
    /// The region fails if any version failed; the first failing version's
    /// cause becomes the region's cause.
    pub fn from_versions(region: &str, success_status: JobStatus, outcomes: Vec<BranchOutcome>) -> Self {
        let poll_count = outcomes.iter().map(|o| o.poll_count).max().unwrap_or(0);
        let cause = outcomes.iter().find_map(|o| {
            o.cause
                .as_ref()
                .map(|c| format!("version {}: {}", o.version_name, c))
        });
        let status = if cause.is_some() {
            JobStatus::Failed
        } else {
            success_status
        };
        Self {
            region: region.to_string(),
            status,
            job: None,
            poll_count,
            cause,
            versions: outcomes.into_iter().map(VersionResult::from).collect(),
        }
    }

    /// A region that failed before any branch of it could run.
    pub fn failed(region: &str, cause: &FailureCause) -> Self {
        Self {
            region: region.to_string(),
            status: JobStatus::Failed,
            job: None,
            poll_count: 0,
            cause: Some(cause.to_string()),
            versions: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.cause.is_none()
    }
}

/// Per-region outcomes in original region order.
///
/// Serializes as a bare JSON array, which is also the notification body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedResult {
    pub entries: Vec<RegionResult>,
}

impl AggregatedResult {
    pub fn new(entries: Vec<RegionResult>) -> Self {
        Self { entries }
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(RegionResult::succeeded)
    }

    pub fn failed_regions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.succeeded())
            .map(|e| e.region.as_str())
            .collect()
    }

    pub fn entry(&self, region: &str) -> Option<&RegionResult> {
        self.entries.iter().find(|e| e.region == region)
    }
}

/// A single message for the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: serde_json::Value,
}

impl Notification {
    pub fn for_result(subject: String, result: &AggregatedResult) -> Result<Self, serde_json::Error> {
        Ok(Self {
            subject,
            body: serde_json::to_value(result)?,
        })
    }
}

/// What a finished workflow run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub workflow: WorkflowKind,
    pub project_name: String,
    pub subject: String,
    pub result: AggregatedResult,
    /// Problems that did not change any branch outcome (e.g. a failed publish).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
