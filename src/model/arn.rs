// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Helpers for provider resource identifiers.
//!
//! Project and version identifiers look like
//! `arn:aws:rekognition:us-east-1:111964674713:project/DeepRacer/1618824849431` and
//! `arn:aws:rekognition:us-east-1:111964674713:project/DeepRacer/version/first/1618824849554`.

const PROJECT_MARKER: &str = ":project/";
const VERSION_MARKER: &str = "/version/";

/// The project name embedded in a project or version identifier.
pub fn project_name(arn: &str) -> Option<&str> {
    segment_after(arn, PROJECT_MARKER)
}

/// The version name embedded in a version identifier.
pub fn version_name(arn: &str) -> Option<&str> {
    segment_after(arn, VERSION_MARKER)
}

/// The region field (fourth colon-separated component).
pub fn region(arn: &str) -> Option<&str> {
    if !arn.starts_with("arn:") {
        return None;
    }
    arn.split(':').nth(3).filter(|r| !r.is_empty())
}

pub fn format_project_arn(region: &str, account: &str, name: &str, timestamp: u64) -> String {
    format!("arn:aws:rekognition:{region}:{account}:project/{name}/{timestamp}")
}

pub fn format_version_arn(
    region: &str,
    account: &str,
    project: &str,
    version: &str,
    timestamp: u64,
) -> String {
    format!("arn:aws:rekognition:{region}:{account}:project/{project}/version/{version}/{timestamp}")
}

// Returns the text between `marker` and the next '/', requiring the trailing '/'.
fn segment_after<'a>(arn: &'a str, marker: &str) -> Option<&'a str> {
    let start = arn.find(marker)? + marker.len();
    let rest = &arn[start..];
    let end = rest.find('/')?;
    let segment = &rest[..end];
    (!segment.is_empty()).then_some(segment)
}
