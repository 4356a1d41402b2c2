// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use crate::errors::StoreError;
use crate::traits::BlobStore;

/// Blob store backed by a local directory: `<root>/<location>/<key>`.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, location: &str, key: &str) -> Result<PathBuf, StoreError> {
        let location_path = relative(location).ok_or_else(|| StoreError::InvalidKey(location.to_string()))?;
        let key_path = relative(key).ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        Ok(self.root.join(location_path).join(key_path))
    }
}

// Only plain relative paths: no root, no "..", nothing empty.
fn relative(value: &str) -> Option<&Path> {
    let path = Path::new(value);
    let plain = !value.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    plain.then_some(path)
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put_object(&self, location: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(location, key)?;
        let io_error = |source| StoreError::Io {
            location: location.to_string(),
            key: key.to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, body).await.map_err(io_error)?;
        Ok(())
    }
}
