// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for polling state machine transitions.
//!
//! Every message names the region and the version of the branch it belongs
//! to, so interleaved output of concurrent branches stays readable.

use crate::observability::messages::StructuredLog;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A branch entered RESOLVE for the first time.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct BranchStarted<'a> {
    pub workflow: &'a str,
    pub region: &'a str,
    pub version: &'a str,
    pub max_polls: u32,
    pub interval: Duration,
}

impl Display for BranchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} branch for version '{}' in {} (up to {} polls every {:?})",
            self.workflow, self.version, self.region, self.max_polls, self.interval
        )
    }
}

impl StructuredLog for BranchStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            workflow = self.workflow,
            region = self.region,
            version = self.version,
            max_polls = self.max_polls,
            interval_secs = self.interval.as_secs(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "branch",
            span_name = name,
            workflow = self.workflow,
            region = self.region,
            version = self.version,
        )
    }
}

/// RESOLVE found a matching job; SUBMIT is skipped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobAttached<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub version_arn: &'a str,
}

impl Display for JobAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attached to existing version '{}' in {} ({})",
            self.version, self.region, self.version_arn
        )
    }
}

impl StructuredLog for JobAttached<'_> {
    fn log(&self) {
        tracing::info!(
            region = self.region,
            version = self.version,
            version_arn = self.version_arn,
            "{}", self
        );
    }
}

/// # Log Level
/// `info!` - Important operational event
pub struct JobSubmitted<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub version_arn: &'a str,
}

impl Display for JobSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Submitted version '{}' in {} ({})",
            self.version, self.region, self.version_arn
        )
    }
}

impl StructuredLog for JobSubmitted<'_> {
    fn log(&self) {
        tracing::info!(
            region = self.region,
            version = self.version,
            version_arn = self.version_arn,
            "{}", self
        );
    }
}

/// Result of one POLL step.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use global_model_lifecycle::observability::messages::branch::PollObserved;
///
/// let msg = PollObserved {
///     region: "us-east-1",
///     version: "v1",
///     poll_count: 3,
///     max_polls: 36,
///     observation: "TRAINING_IN_PROGRESS",
/// };
///
/// assert_eq!(msg.to_string(), "Poll 3/36 of 'v1' in us-east-1: TRAINING_IN_PROGRESS");
/// ```
pub struct PollObserved<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub poll_count: u32,
    pub max_polls: u32,
    pub observation: &'a str,
}

impl Display for PollObserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Poll {}/{} of '{}' in {}: {}",
            self.poll_count, self.max_polls, self.version, self.region, self.observation
        )
    }
}

impl StructuredLog for PollObserved<'_> {
    fn log(&self) {
        tracing::debug!(
            region = self.region,
            version = self.version,
            poll_count = self.poll_count,
            max_polls = self.max_polls,
            observation = self.observation,
            "{}", self
        );
    }
}

/// A provider call failed with a retryable error.
///
/// # Log Level
/// `warn!` - Expected under throttling, worth watching
pub struct TransientProviderError<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub stage: &'a str,
    pub error: &'a dyn Error,
}

impl Display for TransientProviderError<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transient error during {} of '{}' in {}: {}",
            self.stage, self.version, self.region, self.error
        )
    }
}

impl StructuredLog for TransientProviderError<'_> {
    fn log(&self) {
        tracing::warn!(
            region = self.region,
            version = self.version,
            stage = self.stage,
            error = %self.error,
            "{}", self
        );
    }
}

/// # Log Level
/// `warn!` - Expected under throttling, worth watching
pub struct RetryScheduled<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Display for RetryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrying '{}' in {} after {:?} (attempt {}/{})",
            self.version, self.region, self.delay, self.attempt, self.max_attempts
        )
    }
}

impl StructuredLog for RetryScheduled<'_> {
    fn log(&self) {
        tracing::warn!(
            region = self.region,
            version = self.version,
            attempt = self.attempt,
            max_attempts = self.max_attempts,
            delay_secs = self.delay.as_secs(),
            "{}", self
        );
    }
}

/// An existing version was reused although it writes to a different output
/// location than the current input asks for.
///
/// # Log Level
/// `warn!` - Possible drift between runs
pub struct ReusedVersionMismatch<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub requested_output: &'a str,
    pub existing_output: &'a str,
}

impl Display for ReusedVersionMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reusing version '{}' in {} which writes to '{}', not the requested '{}'",
            self.version, self.region, self.existing_output, self.requested_output
        )
    }
}

impl StructuredLog for ReusedVersionMismatch<'_> {
    fn log(&self) {
        tracing::warn!(
            region = self.region,
            version = self.version,
            requested_output = self.requested_output,
            existing_output = self.existing_output,
            "{}", self
        );
    }
}

/// # Log Level
/// `info!` - Important operational event
pub struct BranchSucceeded<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub status: &'a str,
    pub poll_count: u32,
}

impl Display for BranchSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Version '{}' in {} reached {} after {} polls",
            self.version, self.region, self.status, self.poll_count
        )
    }
}

impl StructuredLog for BranchSucceeded<'_> {
    fn log(&self) {
        tracing::info!(
            region = self.region,
            version = self.version,
            status = self.status,
            poll_count = self.poll_count,
            "{}", self
        );
    }
}

/// # Log Level
/// `error!` - Failure requiring attention
pub struct BranchFailed<'a> {
    pub region: &'a str,
    pub version: &'a str,
    pub cause: &'a dyn Error,
    pub poll_count: u32,
}

impl Display for BranchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Version '{}' in {} failed after {} polls: {}",
            self.version, self.region, self.poll_count, self.cause
        )
    }
}

impl StructuredLog for BranchFailed<'_> {
    fn log(&self) {
        tracing::error!(
            region = self.region,
            version = self.version,
            poll_count = self.poll_count,
            cause = %self.cause,
            "{}", self
        );
    }
}
