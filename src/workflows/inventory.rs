// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Read-only listing of projects and versions per region.

use serde::{Deserialize, Serialize};

use crate::errors::RemoteError;
use crate::model::{ProjectRef, VersionRef};
use crate::traits::RemoteJobClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInventory {
    pub name: String,
    pub arn: String,
    pub versions: Vec<VersionRef>,
}

/// Everything one region knows about, or why it could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInventory {
    pub region: String,
    pub projects: Vec<ProjectInventory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegionInventory {
    pub fn failed(region: &str, reason: &str) -> Self {
        Self {
            region: region.to_string(),
            projects: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

/// List one region. Errors end up in the entry, never in the caller.
pub async fn describe_region(
    client: &dyn RemoteJobClient,
    project_filter: Option<&str>,
) -> RegionInventory {
    match collect(client, project_filter).await {
        Ok(projects) => RegionInventory {
            region: client.region().to_string(),
            projects,
            error: None,
        },
        Err(err) => RegionInventory::failed(client.region(), &err.to_string()),
    }
}

async fn collect(
    client: &dyn RemoteJobClient,
    project_filter: Option<&str>,
) -> Result<Vec<ProjectInventory>, RemoteError> {
    let projects = match project_filter {
        Some(name) => client.find_project_by_name(name).await?.into_iter().collect(),
        None => list_all_projects(client).await?,
    };

    let mut inventory = Vec::with_capacity(projects.len());
    for project in projects {
        let versions = list_all_versions(client, &project).await?;
        inventory.push(ProjectInventory {
            name: project.name,
            arn: project.arn,
            versions,
        });
    }
    Ok(inventory)
}

pub async fn list_all_projects(client: &dyn RemoteJobClient) -> Result<Vec<ProjectRef>, RemoteError> {
    let mut projects = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_projects(token).await?;
        projects.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(projects),
        }
    }
}

pub async fn list_all_versions(
    client: &dyn RemoteJobClient,
    project: &ProjectRef,
) -> Result<Vec<VersionRef>, RemoteError> {
    let mut versions = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_versions(project, token).await?;
        versions.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(versions),
        }
    }
}
