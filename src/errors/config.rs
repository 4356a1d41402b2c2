// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors found while validating the region registry, the workflow policies or
/// a workflow input document.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Neither the input nor the registry names a single region
    NoRegions,
    /// The same region appears more than once
    DuplicateRegion {
        /// The repeated region name
        region: String,
    },
    /// A required value is missing or empty
    MissingField {
        /// Where the field lives (e.g. "region us-east-1", "workflow input")
        context: String,
        /// The field name
        field: String,
    },
    /// A poll interval of zero would turn the WAIT step into a busy loop
    InvalidPollInterval {
        /// The workflow variant whose policy is broken
        workflow: String,
    },
    /// A configured number too large to turn into a duration
    ValueTooLarge {
        /// Where the value lives (e.g. "stop policy")
        context: String,
        /// The field name, or the derived quantity that overflows
        field: String,
    },
    /// The poll budget resolves to zero polls
    ZeroPollBudget {
        /// The workflow variant whose policy is broken
        workflow: String,
    },
    /// A branch budget that can never be reached because the overall workflow
    /// timeout fires first. Reported as a warning, never fatal.
    BudgetExceedsWorkflowTimeout {
        /// The workflow variant
        workflow: String,
        /// Per-branch budget in seconds (interval x max polls)
        budget_seconds: u64,
        /// Overall workflow timeout in seconds
        timeout_seconds: u64,
    },
    /// The workflow input document could not be parsed at all
    MalformedInput {
        /// Parser message
        reason: String,
    },
    /// A manifest object key without the `.manifest` suffix
    InvalidManifestKey {
        /// The rejected key
        key: String,
    },
}

impl ValidationError {
    /// Warnings are logged but do not reject the configuration.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationError::BudgetExceedsWorkflowTimeout { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoRegions => {
                write!(f, "no regions configured: the registry and the input are both empty")
            }
            ValidationError::DuplicateRegion { region } => {
                write!(f, "Duplicate region: '{}'", region)
            }
            ValidationError::MissingField { context, field } => {
                write!(f, "{}: '{}' is required and must not be empty", context, field)
            }
            ValidationError::InvalidPollInterval { workflow } => {
                write!(f, "{} policy: poll interval must be greater than zero", workflow)
            }
            ValidationError::ValueTooLarge { context, field } => {
                write!(f, "{}: '{}' is too large", context, field)
            }
            ValidationError::ZeroPollBudget { workflow } => {
                write!(
                    f,
                    "{} policy: poll budget resolves to zero polls (max build time shorter than one interval?)",
                    workflow
                )
            }
            ValidationError::BudgetExceedsWorkflowTimeout {
                workflow,
                budget_seconds,
                timeout_seconds,
            } => {
                write!(
                    f,
                    "{} policy: branch budget of {}s exceeds the workflow timeout of {}s. ",
                    workflow, budget_seconds, timeout_seconds
                )?;
                write!(f, "Branches will be terminated by the workflow timeout before they can time out on their own.")
            }
            ValidationError::MalformedInput { reason } => {
                write!(f, "Malformed workflow input: {}", reason)
            }
            ValidationError::InvalidManifestKey { key } => {
                write!(f, "Manifest key '{}' must end with '.manifest'", key)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
