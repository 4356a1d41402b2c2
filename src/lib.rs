// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // simulated provider, sinks, blob stores
pub mod config;     // config + region registry
pub mod engine;     // state machine, fan-out, runner
pub mod errors;     // error handling
pub mod model;      // inputs, job state, results
pub mod observability;
pub mod traits;     // capabilities at the seams
pub mod workflows;  // build, stop, delete, describe, manifest trigger
