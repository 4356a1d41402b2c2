// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod policy;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, Config, NotificationConfig, PoliciesConfig,
    PolicyConfig, SeedVersion, SimulationConfig,
};
pub use policy::PollPolicy;
pub use registry::RegionRegistry;
pub use runtime::RuntimeBuilder;
pub use validation::{collect_warnings, validate_config};
