//! Configuration validation for the region registry and the workflow policies.
//!
//! Validation accumulates every problem it finds so a broken configuration
//! can be fixed in one pass. Checks run in this order:
//!
//! 1. **Registry**: region names are present and unique
//! 2. **Policies**: every variant has a non-zero interval and a non-zero poll
//!    budget, and no value is too large to compute the budget or the
//!    workflow timeout in seconds
//!
//! A separate pass ([`collect_warnings`]) reports policies whose branch budget
//! can never be used up because the workflow timeout fires first. Warnings are
//! logged by the loader and never reject a configuration.

use std::collections::HashSet;

use crate::config::consts::DEFAULT_WORKFLOW_TIMEOUT_HOURS;
use crate::config::policy::{budget_seconds, interval_seconds, raw_max_polls};
use crate::config::Config;
use crate::errors::ValidationError;
use crate::model::WorkflowKind;

const KINDS: [WorkflowKind; 3] = [WorkflowKind::Build, WorkflowKind::Stop, WorkflowKind::Delete];

/// Validates a loaded configuration.
///
/// An empty registry is accepted: workflow inputs may carry their own regions.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(registry_errors) = validate_registry(config) {
        errors.extend(registry_errors);
    }

    if let Err(policy_errors) = validate_policies(config) {
        errors.extend(policy_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal findings about a configuration.
pub fn collect_warnings(config: &Config) -> Vec<ValidationError> {
    let timeout_seconds = config.workflow_timeout().as_secs();
    KINDS
        .iter()
        .filter_map(|kind| {
            let policy = config.policies.for_kind(*kind);
            let budget_seconds = budget_seconds(*kind, policy)?;
            (budget_seconds > timeout_seconds).then(|| ValidationError::BudgetExceedsWorkflowTimeout {
                workflow: kind.to_string(),
                budget_seconds,
                timeout_seconds,
            })
        })
        .collect()
}

fn validate_registry(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for target in &config.regions {
        if target.region.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                context: "region registry".to_string(),
                field: "region".to_string(),
            });
        } else if !seen.insert(target.region.as_str()) {
            errors.push(ValidationError::DuplicateRegion {
                region: target.region.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_policies(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for kind in KINDS {
        let policy = config.policies.for_kind(kind);
        if interval_seconds(kind, policy) == 0 {
            errors.push(ValidationError::InvalidPollInterval {
                workflow: kind.to_string(),
            });
        } else if budget_seconds(kind, policy).is_none() {
            errors.push(ValidationError::ValueTooLarge {
                context: format!("{} policy", kind),
                field: "poll budget".to_string(),
            });
        } else if raw_max_polls(kind, policy) == 0 {
            errors.push(ValidationError::ZeroPollBudget {
                workflow: kind.to_string(),
            });
        }
    }

    let hours = config
        .workflow_timeout_hours
        .unwrap_or(DEFAULT_WORKFLOW_TIMEOUT_HOURS);
    if hours.checked_mul(3600).is_none() {
        errors.push(ValidationError::ValueTooLarge {
            context: "configuration".to_string(),
            field: "workflow_timeout_hours".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::model::RegionTarget;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert!(collect_warnings(&config).is_empty());
    }

    #[test]
    fn test_duplicate_regions() {
        let config = Config {
            regions: vec![
                RegionTarget::new("us-east-1", "a", "b"),
                RegionTarget::new("us-east-2", "c", "d"),
                RegionTarget::new("us-east-1", "e", "f"),
            ],
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateRegion {
                region: "us-east-1".into()
            }]
        );
    }

    #[test]
    fn test_multiple_errors() {
        let mut config = Config {
            regions: vec![RegionTarget::new("", "a", "b")],
            ..Default::default()
        };
        config.policies.stop = PolicyConfig {
            poll_interval_seconds: Some(0),
            ..Default::default()
        };
        config.policies.build = PolicyConfig {
            poll_interval_seconds: Some(600),
            max_build_time_minutes: Some(5),
            max_polls: None,
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::InvalidPollInterval {
            workflow: "stop".into()
        }));
        assert!(errors.contains(&ValidationError::ZeroPollBudget {
            workflow: "build".into()
        }));
    }

    #[test]
    fn test_budget_longer_than_workflow_timeout_is_a_warning() {
        let mut config = Config {
            workflow_timeout_hours: Some(1),
            ..Default::default()
        };
        config.policies.delete = PolicyConfig {
            poll_interval_seconds: Some(5),
            max_polls: Some(50),
            ..Default::default()
        };

        assert!(validate_config(&config).is_ok());
        let warnings = collect_warnings(&config);
        // build (12h) and stop (50 x 5min) exceed one hour, delete does not
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(ValidationError::is_warning));
    }

    #[test]
    fn test_oversized_policy_values_are_rejected_not_panicking() {
        let mut config = Config {
            workflow_timeout_hours: Some(u64::MAX),
            ..Default::default()
        };
        config.policies.stop = PolicyConfig {
            poll_interval_seconds: Some(u64::MAX / 2),
            max_polls: Some(10),
            ..Default::default()
        };
        config.policies.build = PolicyConfig {
            max_build_time_minutes: Some(u64::MAX),
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ValueTooLarge {
                    context: "build policy".into(),
                    field: "poll budget".into(),
                },
                ValidationError::ValueTooLarge {
                    context: "stop policy".into(),
                    field: "poll budget".into(),
                },
                ValidationError::ValueTooLarge {
                    context: "configuration".into(),
                    field: "workflow_timeout_hours".into(),
                },
            ]
        );
        // the overflowing policies are errors, not warnings as well
        assert!(collect_warnings(&config).is_empty());
    }
}
