// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow trigger documents and the per-branch targets derived from them.
//!
//! Trigger documents use the provider's PascalCase field names
//! (`ProjectName`, `VersionName`, ...). Region targets accept both the
//! `trainingDataBucket`/`outputBucket` spelling and the
//! `trainingDataLocation`/`outputLocation` spelling, plus snake_case so the
//! same type can be read from the YAML region registry.

use crate::errors::{ValidationError, WorkflowError};
use crate::model::arn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Suffix every manifest object key carries.
pub const MANIFEST_SUFFIX: &str = ".manifest";

/// A manifest key ends in `.manifest` and names something before the suffix.
pub fn is_manifest_key(key: &str) -> bool {
    key.strip_suffix(MANIFEST_SUFFIX)
        .is_some_and(|stem| !stem.trim().is_empty())
}

/// One configured region and its storage endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTarget {
    #[serde(alias = "Region")]
    pub region: String,
    #[serde(
        default,
        alias = "training_data_location",
        alias = "trainingDataBucket",
        alias = "TrainingDataBucket"
    )]
    pub training_data_location: String,
    #[serde(
        default,
        alias = "output_location",
        alias = "outputBucket",
        alias = "OutputBucket"
    )]
    pub output_location: String,
}

impl RegionTarget {
    pub fn new(region: &str, training_data_location: &str, output_location: &str) -> Self {
        Self {
            region: region.to_string(),
            training_data_location: training_data_location.to_string(),
            output_location: output_location.to_string(),
        }
    }
}

/// Which workflow graph a request drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    Build,
    Stop,
    Delete,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Build => "build",
            WorkflowKind::Stop => "stop",
            WorkflowKind::Delete => "delete",
        }
    }
}

impl Display for WorkflowKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build trigger: train `VersionName` of `ProjectName` in every region.
///
/// # Example
/// ```json
/// {
///   "ProjectName": "Cats",
///   "VersionName": "v1",
///   "ManifestKey": "cats/train.manifest",
///   "regions": [
///     {"region": "us-east-1", "trainingDataBucket": "cats-train-use1", "outputBucket": "cats-out-use1"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowInput {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub version_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_key: Option<String>,
    /// Overrides the region registry when non-empty.
    #[serde(default, rename = "regions", alias = "Regions")]
    pub regions: Vec<RegionTarget>,
}

/// Stop and delete trigger: act on a set of versions of one project.
///
/// Versions may be named directly or through their identifiers; the two
/// lists are merged. An identifier is used as-is in the region it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionsInput {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub version_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_arn: Option<String>,
    #[serde(default)]
    pub project_version_arns: Vec<String>,
    /// Delete workflow only: remove the project once its versions are gone.
    #[serde(default)]
    pub delete_project: bool,
    #[serde(default, rename = "regions", alias = "Regions")]
    pub regions: Vec<RegionTarget>,
}

impl VersionsInput {
    /// The project name, falling back to the one embedded in the identifiers.
    pub fn effective_project_name(&self) -> Option<String> {
        if !self.project_name.trim().is_empty() {
            return Some(self.project_name.clone());
        }
        self.project_arn
            .iter()
            .chain(self.project_version_arns.iter())
            .find_map(|a| arn::project_name(a))
            .map(str::to_string)
    }

    /// Union of named versions and versions named by identifier, first seen first.
    pub fn effective_version_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.version_names
            .iter()
            .map(String::as_str)
            .chain(
                self.project_version_arns
                    .iter()
                    .filter_map(|a| arn::version_name(a)),
            )
            .filter(|name| !name.trim().is_empty())
            .filter(|name| seen.insert(name.to_string()))
            .map(str::to_string)
            .collect()
    }

    pub fn project_arn_in(&self, region: &str) -> Option<&str> {
        self.project_arn
            .as_deref()
            .filter(|a| arn::region(a) == Some(region))
    }

    pub fn version_arn_in(&self, region: &str, version_name: &str) -> Option<&str> {
        self.project_version_arns
            .iter()
            .map(String::as_str)
            .find(|a| arn::region(a) == Some(region) && arn::version_name(a) == Some(version_name))
    }
}

/// Inventory query: list projects and versions per region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryInput {
    /// Restrict the listing to one project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, rename = "regions", alias = "Regions")]
    pub regions: Vec<RegionTarget>,
}

/// A validated-on-entry workflow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowRequest {
    Build(WorkflowInput),
    Stop(VersionsInput),
    Delete(VersionsInput),
}

impl WorkflowRequest {
    /// Parse a trigger document for the given workflow.
    pub fn from_json(kind: WorkflowKind, document: &str) -> Result<Self, WorkflowError> {
        let malformed = |e: serde_json::Error| {
            WorkflowError::InvalidInput(vec![ValidationError::MalformedInput {
                reason: e.to_string(),
            }])
        };
        Ok(match kind {
            WorkflowKind::Build => WorkflowRequest::Build(serde_json::from_str(document).map_err(malformed)?),
            WorkflowKind::Stop => WorkflowRequest::Stop(serde_json::from_str(document).map_err(malformed)?),
            WorkflowKind::Delete => WorkflowRequest::Delete(serde_json::from_str(document).map_err(malformed)?),
        })
    }

    pub fn kind(&self) -> WorkflowKind {
        match self {
            WorkflowRequest::Build(_) => WorkflowKind::Build,
            WorkflowRequest::Stop(_) => WorkflowKind::Stop,
            WorkflowRequest::Delete(_) => WorkflowKind::Delete,
        }
    }

    /// Regions named by the request itself; empty means "use the registry".
    pub fn input_regions(&self) -> &[RegionTarget] {
        match self {
            WorkflowRequest::Build(input) => &input.regions,
            WorkflowRequest::Stop(input) | WorkflowRequest::Delete(input) => &input.regions,
        }
    }

    pub fn project_name(&self) -> String {
        match self {
            WorkflowRequest::Build(input) => input.project_name.clone(),
            WorkflowRequest::Stop(input) | WorkflowRequest::Delete(input) => {
                input.effective_project_name().unwrap_or_default()
            }
        }
    }

    /// Check the request against the regions it will fan out over.
    ///
    /// Collects every problem instead of stopping at the first one.
    pub fn validate(&self, regions: &[RegionTarget]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        match self {
            WorkflowRequest::Build(input) => {
                require(&mut errors, "workflow input", "ProjectName", &input.project_name);
                require(&mut errors, "workflow input", "VersionName", &input.version_name);
                if let Some(key) = &input.manifest_key {
                    if !is_manifest_key(key) {
                        errors.push(ValidationError::InvalidManifestKey { key: key.clone() });
                    }
                }
                for target in regions {
                    let context = format!("region {}", target.region);
                    require(&mut errors, &context, "trainingDataLocation", &target.training_data_location);
                    require(&mut errors, &context, "outputLocation", &target.output_location);
                }
            }
            WorkflowRequest::Stop(input) | WorkflowRequest::Delete(input) => {
                if input.effective_project_name().is_none() {
                    errors.push(missing("workflow input", "ProjectName"));
                }
                let deleting_project =
                    matches!(self, WorkflowRequest::Delete(_)) && input.delete_project;
                if input.effective_version_names().is_empty() && !deleting_project {
                    errors.push(missing("workflow input", "VersionNames"));
                }
            }
        }

        if regions.is_empty() {
            errors.push(ValidationError::NoRegions);
        }
        let mut seen = HashSet::new();
        for target in regions {
            if target.region.trim().is_empty() {
                errors.push(missing("region entry", "region"));
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
}

fn missing(context: &str, field: &str) -> ValidationError {
    ValidationError::MissingField {
        context: context.to_string(),
        field: field.to_string(),
    }
}

fn require(errors: &mut Vec<ValidationError>, context: &str, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(missing(context, field));
    }
}

/// Training parameters handed to `create_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSpec {
    pub training_data_location: String,
    pub output_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_key: Option<String>,
}

/// Everything one polling state machine needs to know about its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTarget {
    pub region: String,
    pub project_name: String,
    pub version_name: String,
    /// Known project identifier; skips the lookup by name.
    pub project_arn: Option<String>,
    /// Known version identifier; skips the lookup by name.
    pub version_arn: Option<String>,
    /// Present for build branches only.
    pub training: Option<TrainingSpec>,
}

impl BranchTarget {
    pub fn for_build(input: &WorkflowInput, region: &RegionTarget) -> Self {
        Self {
            region: region.region.clone(),
            project_name: input.project_name.clone(),
            version_name: input.version_name.clone(),
            project_arn: None,
            version_arn: None,
            training: Some(TrainingSpec {
                training_data_location: region.training_data_location.clone(),
                output_location: region.output_location.clone(),
                manifest_key: input.manifest_key.clone(),
            }),
        }
    }

    pub fn for_version(input: &VersionsInput, region: &str, version_name: &str) -> Self {
        Self {
            region: region.to_string(),
            project_name: input.effective_project_name().unwrap_or_default(),
            version_name: version_name.to_string(),
            project_arn: input.project_arn_in(region).map(str::to_string),
            version_arn: input.version_arn_in(region, version_name).map(str::to_string),
            training: None,
        }
    }
}
