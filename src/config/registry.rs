// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::model::RegionTarget;

/// The static list of regions a workflow fans out over.
///
/// A workflow input may name its own regions; those win. Entries of the input
/// that only carry a region name pick up their storage endpoints from the
/// registry entry of the same name.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: Vec<RegionTarget>,
}

impl RegionRegistry {
    pub fn new(regions: Vec<RegionTarget>) -> Self {
        Self { regions }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.regions.clone())
    }

    pub fn regions(&self) -> &[RegionTarget] {
        &self.regions
    }

    pub fn get(&self, region: &str) -> Option<&RegionTarget> {
        self.regions.iter().find(|r| r.region == region)
    }

    /// The regions a workflow should run in, in the order they will be submitted.
    pub fn resolve(&self, requested: &[RegionTarget]) -> Vec<RegionTarget> {
        if requested.is_empty() {
            return self.regions.clone();
        }
        requested
            .iter()
            .map(|target| {
                let mut resolved = target.clone();
                if let Some(known) = self.get(&target.region) {
                    if resolved.training_data_location.is_empty() {
                        resolved.training_data_location = known.training_data_location.clone();
                    }
                    if resolved.output_location.is_empty() {
                        resolved.output_location = known.output_location.clone();
                    }
                }
                resolved
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegionRegistry {
        RegionRegistry::new(vec![
            RegionTarget::new("us-east-1", "train-use1", "out-use1"),
            RegionTarget::new("us-east-2", "train-use2", "out-use2"),
        ])
    }

    #[test]
    fn test_empty_request_uses_registry_order() {
        let regions = registry().resolve(&[]);
        let names: Vec<_> = regions.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["us-east-1", "us-east-2"]);
    }

    #[test]
    fn test_request_wins_and_is_completed_from_registry() {
        let requested = vec![
            RegionTarget::new("us-east-2", "", ""),
            RegionTarget::new("eu-west-1", "train-euw1", "out-euw1"),
        ];
        let regions = registry().resolve(&requested);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].training_data_location, "train-use2");
        assert_eq!(regions[0].output_location, "out-use2");
        assert_eq!(regions[1].region, "eu-west-1");
    }
}
