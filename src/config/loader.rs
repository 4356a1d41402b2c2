// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_RETAINED_RUNS, DEFAULT_SIMULATED_ACCOUNT_ID, DEFAULT_SIMULATED_PAGE_SIZE, DEFAULT_SIMULATED_POLLS_TO_COMPLETE,
    DEFAULT_SUBJECT_PREFIX, DEFAULT_SUBMIT_RETRY_ATTEMPTS, DEFAULT_WORKFLOW_TIMEOUT_HOURS,
};
use crate::config::PollPolicy;
use crate::errors::WorkflowError;
use crate::model::{JobStatus, RegionTarget, WorkflowKind};
use crate::observability::messages::validation::{ConfigValidationFailed, ConfigValidationWarning};
use crate::observability::messages::StructuredLog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the orchestrator.
///
/// Holds the region registry, the wait/budget policy of every workflow
/// variant and the workflow-wide limits. Typically loaded from a YAML file;
/// a `.toml` extension selects TOML instead.
///
/// # Fields
/// * `regions` - The region registry: one entry per region and its storage endpoints
/// * `policies` - Poll interval and budget per workflow variant (optional)
/// * `workflow_timeout_hours` - Hard limit for a whole run (optional, defaults to 12)
/// * `submit_retry_attempts` - Retries after transient RESOLVE/SUBMIT errors (optional, defaults to 3)
/// * `max_concurrency` - Cap on concurrently running branches (optional, unbounded)
/// * `retained_runs` - Finished submitted runs kept for status queries (optional, defaults to 100)
/// * `notification` - Notification settings (optional)
/// * `simulation` - Behavior of the built-in simulated provider (optional)
///
/// # Example
/// ```yaml
/// regions:
///   - region: us-east-1
///     training_data_location: cats-training-use1
///     output_location: cats-output-use1
///   - region: us-east-2
///     training_data_location: cats-training-use2
///     output_location: cats-output-use2
/// policies:
///   build:
///     poll_interval_seconds: 300
///     max_build_time_minutes: 720
///   delete:
///     poll_interval_seconds: 5
///     max_polls: 50
/// workflow_timeout_hours: 12
/// notification:
///   subject_prefix: "Global Custom Labels"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub regions: Vec<RegionTarget>,
    #[serde(default)]
    pub policies: PoliciesConfig,
    #[serde(default)]
    pub workflow_timeout_hours: Option<u64>,
    #[serde(default)]
    pub submit_retry_attempts: Option<u32>,
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    #[serde(default)]
    pub retained_runs: Option<usize>,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    pub fn workflow_timeout(&self) -> Duration {
        Duration::from_secs(
            self.workflow_timeout_hours
                .unwrap_or(DEFAULT_WORKFLOW_TIMEOUT_HOURS)
                .saturating_mul(3600),
        )
    }

    pub fn retry_attempts(&self) -> u32 {
        self.submit_retry_attempts
            .unwrap_or(DEFAULT_SUBMIT_RETRY_ATTEMPTS)
    }

    pub fn retained_runs(&self) -> usize {
        self.retained_runs.unwrap_or(DEFAULT_RETAINED_RUNS)
    }

    pub fn subject_prefix(&self) -> &str {
        self.notification
            .subject_prefix
            .as_deref()
            .unwrap_or(DEFAULT_SUBJECT_PREFIX)
    }

    pub fn policy(&self, kind: WorkflowKind) -> PollPolicy {
        PollPolicy::from_config(kind, self.policies.for_kind(kind))
    }
}

/// Per-variant policy sections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PoliciesConfig {
    #[serde(default)]
    pub build: PolicyConfig,
    #[serde(default)]
    pub stop: PolicyConfig,
    #[serde(default)]
    pub delete: PolicyConfig,
}

impl PoliciesConfig {
    pub fn for_kind(&self, kind: WorkflowKind) -> &PolicyConfig {
        match kind {
            WorkflowKind::Build => &self.build,
            WorkflowKind::Stop => &self.stop,
            WorkflowKind::Delete => &self.delete,
        }
    }
}

/// Wait interval and poll budget of one workflow variant.
///
/// # Fields
/// * `poll_interval_seconds` - Delay of the WAIT step
/// * `max_build_time_minutes` - Budget expressed as time; divided by the interval
/// * `max_polls` - Budget expressed as a poll count; wins over `max_build_time_minutes`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyConfig {
    pub poll_interval_seconds: Option<u64>,
    pub max_build_time_minutes: Option<u64>,
    pub max_polls: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub subject_prefix: Option<String>,
}

/// Settings of the in-process simulated provider used by the CLI.
///
/// # Example
/// ```yaml
/// simulation:
///   page_size: 2
///   polls_to_complete: 3
///   failing_regions: [us-east-2]
///   seed:
///     - region: us-east-1
///       project: Cats
///       version: v1
///       status: RUNNING
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub page_size: Option<usize>,
    pub polls_to_complete: Option<u32>,
    #[serde(default)]
    pub failing_regions: Vec<String>,
    /// Every n-th describe call fails with a transient error.
    pub transient_every: Option<u32>,
    pub account_id: Option<String>,
    #[serde(default)]
    pub seed: Vec<SeedVersion>,
}

impl SimulationConfig {
    pub fn get_page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_SIMULATED_PAGE_SIZE)
            .max(1)
    }

    pub fn get_polls_to_complete(&self) -> u32 {
        self.polls_to_complete
            .unwrap_or(DEFAULT_SIMULATED_POLLS_TO_COMPLETE)
    }

    pub fn get_account_id(&self) -> &str {
        self.account_id
            .as_deref()
            .unwrap_or(DEFAULT_SIMULATED_ACCOUNT_ID)
    }
}

/// A version that exists in the simulated provider before any workflow runs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedVersion {
    pub region: String,
    pub project: String,
    pub version: String,
    pub status: JobStatus,
}

/// Load a config from a YAML (or, by extension, TOML) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, WorkflowError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| WorkflowError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let cfg = if is_toml {
        toml::from_str(&content).map_err(|e| WorkflowError::Config(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| WorkflowError::Config(e.to_string()))?
    };
    Ok(cfg)
}

/// Load and validate a config file
///
/// Errors reject the configuration; warnings are logged and the
/// configuration is returned.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, WorkflowError> {
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_config(&cfg) {
        ConfigValidationFailed {
            error_count: validation_errors.len(),
        }
        .log();
        let error_messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        return Err(WorkflowError::Config(format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        )));
    }

    for warning in crate::config::collect_warnings(&cfg) {
        ConfigValidationWarning { warning: &warning }.log();
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
regions:
  - region: us-east-1
    training_data_location: train-use1
    output_location: out-use1
  - region: us-east-2
    trainingDataBucket: train-use2
    outputBucket: out-use2
policies:
  build:
    poll_interval_seconds: 300
    max_build_time_minutes: 180
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.regions.len(), 2);
        assert_eq!(cfg.regions[0].training_data_location, "train-use1");
        assert_eq!(cfg.regions[1].output_location, "out-use2");
        assert_eq!(cfg.policy(WorkflowKind::Build).max_polls, 36);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let cfg: Config = serde_yaml::from_str("regions: []").unwrap();
        assert_eq!(cfg.workflow_timeout(), Duration::from_secs(12 * 3600));
        assert_eq!(cfg.retry_attempts(), 3);
        assert_eq!(cfg.subject_prefix(), "Global Custom Labels");
        assert_eq!(cfg.policy(WorkflowKind::Delete).interval, Duration::from_secs(5));
        assert_eq!(cfg.simulation.get_page_size(), 50);
        assert_eq!(cfg.max_concurrency, None);
    }

    #[test]
    fn test_parse_simulation_seed() {
        let yaml = r#"
simulation:
  page_size: 2
  failing_regions: [us-east-2]
  seed:
    - region: us-east-1
      project: Cats
      version: v1
      status: RUNNING
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.simulation.get_page_size(), 2);
        assert_eq!(cfg.simulation.failing_regions, vec!["us-east-2"]);
        assert_eq!(cfg.simulation.seed[0].status, JobStatus::Running);
    }
}
