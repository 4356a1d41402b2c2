// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::errors::SinkError;
use crate::model::Notification;
use crate::traits::NotificationSink;

/// Emits each notification as a structured log event.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn publish(&self, notification: &Notification) -> Result<(), SinkError> {
        let body = serde_json::to_string(&notification.body)?;
        tracing::info!(subject = %notification.subject, body = %body, "notification");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Appends each notification to a file as one JSON line.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NotificationSink for FileSink {
    async fn publish(&self, notification: &Notification) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(notification)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
