// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the orchestrator. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Keep log wording out of the control flow
//! * Attach the same structured fields to every occurrence of an event
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::workflow` - Run lifecycle, fan-out and notification events
//! * `messages::branch` - Polling state machine transitions of a single branch
//! * `messages::validation` - Configuration and input validation warnings and errors
//!
//! # Usage
//!
//! ```rust
//! use global_model_lifecycle::observability::messages::branch::BranchSucceeded;
//! use global_model_lifecycle::observability::messages::StructuredLog;
//!
//! BranchSucceeded {
//!     region: "us-east-1",
//!     version: "v1",
//!     status: "TRAINING_COMPLETED",
//!     poll_count: 3,
//! }
//! .log();
//! ```

pub mod messages;
