// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;
use thiserror::Error;

use crate::errors::{RemoteError, StoreError, ValidationError};

/// Why a branch ended in TERMINAL_FAILURE.
///
/// Every variant is reported through the same path (the branch's entry in the
/// aggregated result); the rendered string is the `cause` field of that entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The provider reported a failed status for the job.
    #[error("DescribeJob returned FAILED")]
    RemoteFailure,

    /// The branch ran out of polls before reaching a terminal status.
    #[error("timed out after {polls} polls")]
    Timeout { polls: u32 },

    /// The job disappeared while the workflow still needed it.
    #[error("job no longer exists: {0}")]
    NotFound(String),

    /// Resolving or submitting the job failed.
    #[error("submission failed: {0}")]
    Submission(RemoteError),

    /// The branch task itself died (panic or abort).
    #[error("branch aborted: {0}")]
    Aborted(String),
}

/// Workflow-level errors. Branch failures never show up here: only problems
/// that stop the whole workflow before (or instead of) producing a result.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The workflow input was rejected before any branch started.
    #[error("invalid workflow input:\n{}", join_errors(.0))]
    InvalidInput(Vec<ValidationError>),

    /// The configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// No remote client could be created for a region.
    #[error("no remote client available for region '{region}': {reason}")]
    ClientUnavailable { region: String, reason: String },

    /// The overall wall-clock budget elapsed; every branch was terminated.
    #[error("workflow timed out after {0:?}")]
    TimedOut(Duration),

    /// The run was cancelled; every branch was terminated.
    #[error("workflow cancelled")]
    Cancelled,

    /// Status or cancellation was requested for a run id that was never issued.
    #[error("unknown workflow run '{0}'")]
    UnknownRun(String),

    /// A manifest could not be copied to a region's training location.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
