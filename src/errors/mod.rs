// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod remote;
mod workflow;

pub use config::ValidationError;
pub use remote::{RemoteError, SinkError, StoreError};
pub use workflow::{FailureCause, WorkflowError};
