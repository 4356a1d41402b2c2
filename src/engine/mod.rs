// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod coordinator;
pub mod factory;
pub mod poll_machine;
pub mod runner;

pub use coordinator::FanOutCoordinator;
pub use factory::WorkflowFactory;
pub use poll_machine::{BranchState, PollingStateMachine};
pub use runner::{RunId, RunStatus, WorkflowRunner};
