// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its level with structured fields.
//!
//! # Organization
//!
//! * `workflow` - Run lifecycle, fan-out and notification events
//! * `branch` - Polling state machine transitions
//! * `validation` - Configuration and input validation warnings and errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use global_model_lifecycle::observability::messages::workflow::WorkflowStarted;
//!
//! let msg = WorkflowStarted {
//!     run_id: "5b2f0c1e",
//!     workflow: "build",
//!     project: "Cats",
//!     region_count: 2,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod branch;
pub mod validation;
pub mod workflow;

use tracing::Span;

/// A log event with a fixed level and a fixed set of structured fields.
pub trait StructuredLog {
    /// Emit the event at its level.
    fn log(&self);

    /// A span carrying the message's fields, for work that follows the event.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("event", span_name = name)
    }
}
