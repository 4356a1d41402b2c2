// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{Config, RegionRegistry};
use crate::engine::WorkflowRunner;
use crate::traits::{ClientFactory, NotificationSink};

/// Runtime builder - ties a loaded configuration to the injected capabilities.
///
/// The `RuntimeBuilder` is the one place where the region registry, the
/// per-variant policies and the workflow limits meet the remote client
/// factory and the notification sink.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use global_model_lifecycle::backends::{SimulatedProvider, TracingSink};
/// use global_model_lifecycle::config::{Config, RuntimeBuilder};
///
/// let config = Config::default();
/// let provider = Arc::new(SimulatedProvider::from_config(&config.simulation));
/// let runner = RuntimeBuilder::from_config(&config, provider, Arc::new(TracingSink));
/// assert!(runner.registry().regions().is_empty());
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a workflow runner from configuration.
    ///
    /// # Arguments
    /// * `cfg` - Registry, policies and limits
    /// * `factory` - Hands out one remote client per region
    /// * `sink` - Receives one notification per finished workflow
    pub fn from_config(
        cfg: &Config,
        factory: Arc<dyn ClientFactory>,
        sink: Arc<dyn NotificationSink>,
    ) -> WorkflowRunner {
        WorkflowRunner::new(cfg.clone(), RegionRegistry::from_config(cfg), factory, sink)
    }
}
