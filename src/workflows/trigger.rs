// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::RegionRegistry;
use crate::errors::{ValidationError, WorkflowError};
use crate::model::{is_manifest_key, WorkflowInput};
use crate::observability::messages::workflow::ManifestCopied;
use crate::observability::messages::StructuredLog;
use crate::traits::BlobStore;

/// A manifest as it arrives from the upload endpoint.
#[derive(Debug, Clone)]
pub struct ManifestUpload {
    pub project_name: String,
    pub version_name: String,
    pub key: String,
    pub body: Vec<u8>,
}

/// Turns an uploaded manifest into a build request.
///
/// The manifest is copied to the training-data location of every registered
/// region first, so each regional build finds it next to its data.
pub struct ManifestTrigger {
    store: Arc<dyn BlobStore>,
    registry: RegionRegistry,
}

impl ManifestTrigger {
    pub fn new(store: Arc<dyn BlobStore>, registry: RegionRegistry) -> Self {
        Self { store, registry }
    }

    pub async fn ingest(&self, upload: &ManifestUpload) -> Result<WorkflowInput, WorkflowError> {
        self.check(upload).map_err(WorkflowError::InvalidInput)?;

        for region in self.registry.regions() {
            self.store
                .put_object(&region.training_data_location, &upload.key, &upload.body)
                .await?;
            ManifestCopied {
                region: &region.region,
                location: &region.training_data_location,
                key: &upload.key,
            }
            .log();
        }

        Ok(WorkflowInput {
            project_name: upload.project_name.clone(),
            version_name: upload.version_name.clone(),
            manifest_key: Some(upload.key.clone()),
            regions: self.registry.regions().to_vec(),
        })
    }

    fn check(&self, upload: &ManifestUpload) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if !is_manifest_key(&upload.key) {
            errors.push(ValidationError::InvalidManifestKey {
                key: upload.key.clone(),
            });
        }
        for (field, value) in [
            ("ProjectName", &upload.project_name),
            ("VersionName", &upload.version_name),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::MissingField {
                    context: "manifest upload".into(),
                    field: field.into(),
                });
            }
        }
        if self.registry.regions().is_empty() {
            errors.push(ValidationError::NoRegions);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::MemoryStore;
    use crate::model::RegionTarget;

    fn registry() -> RegionRegistry {
        RegionRegistry::new(vec![
            RegionTarget::new("us-east-1", "train-use1", "out-use1"),
            RegionTarget::new("eu-west-1", "train-euw1", "out-euw1"),
        ])
    }

    fn upload(key: &str) -> ManifestUpload {
        ManifestUpload {
            project_name: "Cats".into(),
            version_name: "v1".into(),
            key: key.into(),
            body: b"{\"source-ref\": \"s3://train/cat.jpg\"}".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_manifest_is_copied_to_every_region() {
        let store = MemoryStore::new();
        let trigger = ManifestTrigger::new(Arc::new(store.clone()), registry());

        let input = trigger.ingest(&upload("cats/train.manifest")).await.unwrap();

        assert_eq!(input.manifest_key.as_deref(), Some("cats/train.manifest"));
        assert_eq!(input.regions.len(), 2);
        let locations: Vec<_> = store.objects().into_iter().map(|(l, _, _)| l).collect();
        assert_eq!(locations, vec!["train-use1", "train-euw1"]);
    }

    #[tokio::test]
    async fn test_key_without_suffix_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        let trigger = ManifestTrigger::new(Arc::new(store.clone()), registry());

        for key in ["cats/train.json", ".manifest"] {
            let err = trigger.ingest(&upload(key)).await.unwrap_err();

            match err {
                WorkflowError::InvalidInput(errors) => assert_eq!(
                    errors,
                    vec![ValidationError::InvalidManifestKey { key: key.into() }]
                ),
                other => panic!("unexpected error: {}", other),
            }
        }
        assert!(store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_storage_error() {
        let store = MemoryStore::rejecting("train-euw1");
        let trigger = ManifestTrigger::new(Arc::new(store), registry());

        let err = trigger.ingest(&upload("cats/train.manifest")).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Storage(_)));
    }
}
