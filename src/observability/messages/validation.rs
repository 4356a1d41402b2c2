// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration and input validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Configuration validation rejected the file.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ConfigValidationFailed {
    pub error_count: usize,
}

impl Display for ConfigValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} errors",
            self.error_count
        )
    }
}

impl StructuredLog for ConfigValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }
}

/// A non-fatal configuration finding.
///
/// # Log Level
/// `warn!` - Potential issue, configuration still accepted
///
/// # Example
/// ```
/// use global_model_lifecycle::errors::ValidationError;
/// use global_model_lifecycle::observability::messages::validation::ConfigValidationWarning;
///
/// let warning = ValidationError::BudgetExceedsWorkflowTimeout {
///     workflow: "stop".into(),
///     budget_seconds: 15_000,
///     timeout_seconds: 3_600,
/// };
/// let msg = ConfigValidationWarning { warning: &warning };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ConfigValidationWarning<'a> {
    pub warning: &'a ValidationError,
}

impl Display for ConfigValidationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration warning: {}", self.warning)
    }
}

impl StructuredLog for ConfigValidationWarning<'_> {
    fn log(&self) {
        tracing::warn!("{}", self);
    }
}

/// A workflow input was rejected before any branch started.
///
/// # Log Level
/// `warn!` - Caller error
pub struct InputRejected<'a> {
    pub workflow: &'a str,
    pub errors: &'a [ValidationError],
}

impl Display for InputRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let reasons: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(
            f,
            "Rejected {} workflow input: {}",
            self.workflow,
            reasons.join("; ")
        )
    }
}

impl StructuredLog for InputRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            workflow = self.workflow,
            error_count = self.errors.len(),
            "{}", self
        );
    }
}
