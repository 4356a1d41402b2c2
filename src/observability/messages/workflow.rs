// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow run lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run start, completion, timeout and cancellation
//! * Branches that died before reporting an outcome
//! * Notification delivery
//! * Manifest ingestion

use crate::observability::messages::StructuredLog;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A workflow run started fanning out.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use global_model_lifecycle::observability::messages::workflow::WorkflowStarted;
///
/// let msg = WorkflowStarted {
///     run_id: "5b2f0c1e",
///     workflow: "delete",
///     project: "Cats",
///     region_count: 2,
/// };
///
/// assert!(msg.to_string().contains("2 regions"));
/// ```
pub struct WorkflowStarted<'a> {
    pub run_id: &'a str,
    pub workflow: &'a str,
    pub project: &'a str,
    pub region_count: usize,
}

impl Display for WorkflowStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} workflow {} for project '{}' across {} regions",
            self.workflow, self.run_id, self.project, self.region_count
        )
    }
}

impl StructuredLog for WorkflowStarted<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = self.run_id,
            workflow = self.workflow,
            project = self.project,
            region_count = self.region_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow",
            span_name = name,
            run_id = self.run_id,
            workflow = self.workflow,
            project = self.project,
        )
    }
}

/// Every branch reached a terminal state and the result was aggregated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkflowCompleted<'a> {
    pub run_id: &'a str,
    pub workflow: &'a str,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Display for WorkflowCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} workflow {} completed in {:?}: {} regions succeeded, {} failed",
            self.workflow, self.run_id, self.duration, self.succeeded, self.failed
        )
    }
}

impl StructuredLog for WorkflowCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = self.run_id,
            workflow = self.workflow,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// The hard wall-clock limit fired; all branches were dropped.
///
/// Remote jobs that were in flight keep running and must be reconciled by a
/// delete workflow.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkflowTimedOut<'a> {
    pub run_id: &'a str,
    pub workflow: &'a str,
    pub timeout: Duration,
}

impl Display for WorkflowTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} workflow {} exceeded its {:?} limit; in-flight remote jobs are left as they are",
            self.workflow, self.run_id, self.timeout
        )
    }
}

impl StructuredLog for WorkflowTimedOut<'_> {
    fn log(&self) {
        tracing::error!(
            run_id = self.run_id,
            workflow = self.workflow,
            timeout_secs = self.timeout.as_secs(),
            "{}", self
        );
    }
}

/// # Log Level
/// `warn!` - Operator action
pub struct WorkflowCancelled<'a> {
    pub run_id: &'a str,
    pub workflow: &'a str,
}

impl Display for WorkflowCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} workflow {} cancelled", self.workflow, self.run_id)
    }
}

impl StructuredLog for WorkflowCancelled<'_> {
    fn log(&self) {
        tracing::warn!(run_id = self.run_id, workflow = self.workflow, "{}", self);
    }
}

/// A branch task died (panic or abort) instead of returning an outcome.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct BranchAborted<'a> {
    pub reason: &'a str,
}

impl Display for BranchAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Branch task aborted: {}", self.reason)
    }
}

impl StructuredLog for BranchAborted<'_> {
    fn log(&self) {
        tracing::error!(reason = self.reason, "{}", self);
    }
}

/// # Log Level
/// `info!` - Important operational event
pub struct NotificationPublished<'a> {
    pub sink: &'a str,
    pub subject: &'a str,
}

impl Display for NotificationPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Published '{}' via {}", self.subject, self.sink)
    }
}

impl StructuredLog for NotificationPublished<'_> {
    fn log(&self) {
        tracing::info!(sink = self.sink, subject = self.subject, "{}", self);
    }
}

/// Publishing failed. Not retried; recorded as a workflow warning.
///
/// # Log Level
/// `warn!` - Degraded delivery, outcomes unaffected
///
/// # Example
/// ```
/// use global_model_lifecycle::observability::messages::workflow::NotificationFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "topic unavailable");
/// let msg = NotificationFailed {
///     sink: "file",
///     subject: "Global Custom Labels Model Build Result for Project: Cats, Version: v1",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct NotificationFailed<'a> {
    pub sink: &'a str,
    pub subject: &'a str,
    pub error: &'a dyn Error,
}

impl Display for NotificationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to publish '{}' via {}: {}",
            self.subject, self.sink, self.error
        )
    }
}

impl StructuredLog for NotificationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            sink = self.sink,
            subject = self.subject,
            error = %self.error,
            "{}", self
        );
    }
}

/// A manifest was copied into one region's training location.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ManifestCopied<'a> {
    pub region: &'a str,
    pub location: &'a str,
    pub key: &'a str,
}

impl Display for ManifestCopied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Copied manifest '{}' to '{}' for {}",
            self.key, self.location, self.region
        )
    }
}

impl StructuredLog for ManifestCopied<'_> {
    fn log(&self) {
        tracing::info!(
            region = self.region,
            location = self.location,
            key = self.key,
            "{}", self
        );
    }
}
