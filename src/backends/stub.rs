// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};

use crate::errors::{SinkError, StoreError};
use crate::model::Notification;
use crate::traits::{BlobStore, NotificationSink};

/// A sink that keeps every notification for later inspection
#[derive(Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, notification: &Notification) -> Result<(), SinkError> {
        self.published.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A sink that always rejects, for warning-path tests
pub struct FailingSink;

#[async_trait::async_trait]
impl NotificationSink for FailingSink {
    async fn publish(&self, _notification: &Notification) -> Result<(), SinkError> {
        Err(SinkError::Rejected("subscriber unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// An in-memory blob store: (location, key, body) in write order
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
    reject_location: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes to this location fail with an I/O error.
    pub fn rejecting(location: &str) -> Self {
        Self {
            reject_location: Some(location.to_string()),
            ..Self::default()
        }
    }

    pub fn objects(&self) -> Vec<(String, String, Vec<u8>)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryStore {
    async fn put_object(&self, location: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        if self.reject_location.as_deref() == Some(location) {
            return Err(StoreError::Io {
                location: location.to_string(),
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .push((location.to_string(), key.to_string(), body.to_vec()));
        Ok(())
    }
}
