// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Implementations of the external capabilities the orchestrator drives.
//!
//! # Available Backends
//!
//! ## Simulated Provider
//! In-process stand-in for the remote training provider:
//! - **Regions**: one simulated world, one client per region branch
//! - **Determinism**: jobs advance per describe call, not per wall-clock time
//! - **Fault injection**: failing regions, periodic throttling, one-shot errors per call
//! - **Use Case**: the CLI, integration tests, trying out policies
//!
//! ## Notification Sinks
//! - **TracingSink**: logs the notification as a structured event
//! - **FileSink**: appends one JSON line per notification
//!
//! ## Blob Store
//! - **FsBlobStore**: writes objects under a local root directory
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities (only available in test builds):
//! - **RecordingSink**: keeps every published notification
//! - **FailingSink**: rejects every publish
//! - **MemoryStore**: keeps written objects in memory
//!
//! # Examples
//!
//! ```rust
//! use global_model_lifecycle::backends::SimulatedProvider;
//! use global_model_lifecycle::model::RegionTarget;
//! use global_model_lifecycle::traits::ClientFactory;
//!
//! let provider = SimulatedProvider::builder().polls_to_complete(3).build();
//! let client = provider.client_for(&RegionTarget::new("us-east-1", "train", "out"))?;
//! assert_eq!(client.region(), "us-east-1");
//! # Ok::<(), global_model_lifecycle::errors::RemoteError>(())
//! ```

pub mod fs_store;
pub mod simulated;
pub mod sinks;
#[cfg(test)]
pub mod stub;

pub use fs_store::FsBlobStore;
pub use simulated::{CallCounts, SimCall, SimulatedJobClient, SimulatedProvider};
pub use sinks::{FileSink, TracingSink};
