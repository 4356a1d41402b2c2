// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data model shared by every workflow variant.
//!
//! * `input` - workflow trigger documents, region targets and branch targets
//! * `job` - remote job identity, status and per-branch poll state
//! * `result` - branch outcomes, the aggregated result and the notification
//! * `arn` - helpers for the provider's resource identifiers

pub mod arn;
pub mod input;
pub mod job;
pub mod result;

pub use input::{
    is_manifest_key, BranchTarget, InventoryInput, RegionTarget, TrainingSpec, VersionsInput, WorkflowInput,
    WorkflowKind, WorkflowRequest, MANIFEST_SUFFIX,
};
pub use job::{JobHandle, JobStatus, Observation, PollState, ProjectRef, VersionRef};
pub use result::{AggregatedResult, BranchOutcome, Notification, RegionResult, WorkflowReport};
