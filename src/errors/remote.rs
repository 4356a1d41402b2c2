// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by the external capabilities the orchestrator drives.
//!
//! `RemoteError` is the failure taxonomy of the remote job client. The polling
//! state machine never propagates it directly: it classifies each variant into
//! "keep polling", "treat as absent" or a terminal failure for that branch only.

use thiserror::Error;

/// Failure reported by a [`RemoteJobClient`](crate::traits::RemoteJobClient) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Throttling or network trouble. Safe to retry on the next cycle.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// The addressed project or version does not exist (any more).
    #[error("not found: {0}")]
    NotFound(String),

    /// A project with the requested name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Any other provider-side rejection. Never retried.
    #[error("provider error: {0}")]
    Provider(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

/// Failure to deliver a notification.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize notification body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write notification: {0}")]
    Io(#[from] std::io::Error),

    #[error("notification rejected by subscriber: {0}")]
    Rejected(String),
}

/// Failure to write an object through a [`BlobStore`](crate::traits::BlobStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("failed to write object '{key}' to '{location}': {source}")]
    Io {
        location: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}
