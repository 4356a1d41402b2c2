#[cfg(test)]
mod integration_tests {
    use crate::config::{load_and_validate_config, load_config, RegionRegistry};
    use crate::model::WorkflowKind;
    use std::io::Write;
    use std::time::Duration;

    /// Test that the reference YAML configuration loads with the reference policies
    #[test]
    fn test_reference_yaml_loading() {
        let config = load_and_validate_config("configs/global-models.yaml").unwrap();

        assert_eq!(config.regions.len(), 2);
        assert_eq!(config.regions[0].region, "us-east-1");
        assert_eq!(config.regions[1].output_location, "custom-labels-output-us-east-2");

        let build = config.policy(WorkflowKind::Build);
        assert_eq!(build.interval, Duration::from_secs(300));
        assert_eq!(build.max_polls, 144);
        assert_eq!(config.policy(WorkflowKind::Stop).max_polls, 50);
        assert_eq!(config.policy(WorkflowKind::Delete).interval, Duration::from_secs(5));
        assert_eq!(config.workflow_timeout(), Duration::from_secs(12 * 3600));
    }

    /// Test that the TOML variant is selected by extension
    #[test]
    fn test_toml_loading() {
        let config = load_and_validate_config("configs/global-models.toml").unwrap();

        assert_eq!(config.max_concurrency, Some(2));
        assert_eq!(config.policy(WorkflowKind::Build).max_polls, 36);
        assert_eq!(RegionRegistry::from_config(&config).regions().len(), 2);
    }

    #[test]
    fn test_simulation_demo_loading() {
        let config = load_and_validate_config("configs/simulated-demo.yaml").unwrap();
        assert_eq!(config.simulation.failing_regions, vec!["us-east-2"]);
        assert_eq!(config.simulation.seed.len(), 1);
    }

    #[test]
    fn test_invalid_config_lists_every_error() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
regions:
  - region: us-east-1
  - region: us-east-1
policies:
  delete:
    poll_interval_seconds: 0
"#
        )
        .unwrap();

        let err = load_and_validate_config(file.path()).unwrap_err().to_string();
        assert!(err.contains("Duplicate region: 'us-east-1'"));
        assert!(err.contains("delete policy: poll interval must be greater than zero"));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = load_config("configs/does-not-exist.yaml").unwrap_err();
        assert!(err.to_string().starts_with("configuration error: cannot read"));
    }
}
