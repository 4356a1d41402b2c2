// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process stand-in for the remote training provider.
//!
//! One [`SimulatedProvider`] holds the simulated remote world for every
//! region; it hands out one [`SimulatedJobClient`] per region branch. Jobs
//! advance only when they are described, so the number of polls a branch
//! needs is deterministic:
//!
//! * training reaches `TRAINING_COMPLETED` on the `polls_to_complete`-th describe
//!   (or `FAILED` on the first describe in a failing region)
//! * `STOPPING` becomes `STOPPED` the same way
//! * `DELETING` versions disappear, after which describe reports not found
//!
//! Listings are paginated with `page_size` items per page.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::consts::{
    DEFAULT_SIMULATED_ACCOUNT_ID, DEFAULT_SIMULATED_PAGE_SIZE, DEFAULT_SIMULATED_POLLS_TO_COMPLETE,
};
use crate::config::SimulationConfig;
use crate::errors::RemoteError;
use crate::model::arn::{format_project_arn, format_version_arn};
use crate::model::{JobHandle, JobStatus, ProjectRef, RegionTarget, TrainingSpec, VersionRef};
use crate::traits::{ClientFactory, Page, RemoteJobClient};

const EPOCH_MILLIS: u64 = 1_618_824_849_431;

/// Provider calls, for failure injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimCall {
    ListProjects,
    ListVersions,
    CreateProject,
    CreateVersion,
    Describe,
    Stop,
    DeleteVersion,
    DeleteProject,
}

/// Number of calls a region's clients made, failed calls included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_projects: u32,
    pub list_versions: u32,
    pub create_project: u32,
    pub create_version: u32,
    pub describe: u32,
    pub stop: u32,
    pub delete_version: u32,
    pub delete_project: u32,
}

impl CallCounts {
    fn bump(&mut self, call: SimCall) {
        let counter = match call {
            SimCall::ListProjects => &mut self.list_projects,
            SimCall::ListVersions => &mut self.list_versions,
            SimCall::CreateProject => &mut self.create_project,
            SimCall::CreateVersion => &mut self.create_version,
            SimCall::Describe => &mut self.describe,
            SimCall::Stop => &mut self.stop,
            SimCall::DeleteVersion => &mut self.delete_version,
            SimCall::DeleteProject => &mut self.delete_project,
        };
        *counter += 1;
    }
}

#[derive(Debug, Clone)]
struct Settings {
    page_size: usize,
    polls_to_complete: u32,
    failing_regions: HashSet<String>,
    transient_every: Option<u32>,
    account_id: String,
}

#[derive(Debug, Default)]
struct World {
    regions: HashMap<String, RegionWorld>,
    clock: u64,
    unavailable: HashSet<String>,
}

impl World {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        EPOCH_MILLIS + self.clock
    }

    fn region(&mut self, name: &str) -> &mut RegionWorld {
        self.regions.entry(name.to_string()).or_default()
    }
}

#[derive(Debug, Default)]
struct RegionWorld {
    projects: Vec<SimProject>,
    calls: CallCounts,
    failures: HashMap<SimCall, VecDeque<RemoteError>>,
}

impl RegionWorld {
    // Counts the call, then hands out the next injected failure for it, if any.
    fn enter(&mut self, call: SimCall) -> Result<(), RemoteError> {
        self.calls.bump(call);
        match self.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn project_index(&self, arn: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.arn == arn)
    }

    fn locate(&self, handle: &JobHandle) -> Option<(usize, usize)> {
        let project = self.project_index(&handle.project_arn)?;
        let version = self.projects[project]
            .versions
            .iter()
            .position(|v| v.arn == handle.version_arn)?;
        Some((project, version))
    }
}

#[derive(Debug)]
struct SimProject {
    name: String,
    arn: String,
    versions: Vec<SimVersion>,
}

impl SimProject {
    fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            name: self.name.clone(),
            arn: self.arn.clone(),
        }
    }
}

#[derive(Debug)]
struct SimVersion {
    name: String,
    arn: String,
    status: JobStatus,
    output_location: Option<String>,
    remaining: u32,
    script: VecDeque<Result<JobStatus, RemoteError>>,
}

impl SimVersion {
    fn to_ref(&self) -> VersionRef {
        VersionRef {
            name: self.name.clone(),
            arn: self.arn.clone(),
            status: self.status,
            output_location: self.output_location.clone(),
        }
    }
}

/// The simulated remote world, shared by the clients it hands out.
#[derive(Clone)]
pub struct SimulatedProvider {
    world: Arc<Mutex<World>>,
    settings: Arc<Settings>,
}

/// Builder for [`SimulatedProvider`].
///
/// # Example
/// ```
/// use global_model_lifecycle::backends::SimulatedProvider;
///
/// let provider = SimulatedProvider::builder()
///     .page_size(2)
///     .polls_to_complete(3)
///     .failing_region("us-east-2")
///     .build();
/// # let _ = provider;
/// ```
pub struct SimulatedProviderBuilder {
    settings: Settings,
}

impl SimulatedProviderBuilder {
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.settings.page_size = page_size.max(1);
        self
    }

    pub fn polls_to_complete(mut self, polls: u32) -> Self {
        self.settings.polls_to_complete = polls;
        self
    }

    pub fn failing_region(mut self, region: &str) -> Self {
        self.settings.failing_regions.insert(region.to_string());
        self
    }

    /// Every n-th describe call in a region fails with a transient error.
    pub fn transient_every(mut self, every: u32) -> Self {
        self.settings.transient_every = (every > 0).then_some(every);
        self
    }

    pub fn account_id(mut self, account_id: &str) -> Self {
        self.settings.account_id = account_id.to_string();
        self
    }

    pub fn build(self) -> SimulatedProvider {
        SimulatedProvider {
            world: Arc::new(Mutex::new(World::default())),
            settings: Arc::new(self.settings),
        }
    }
}

impl SimulatedProvider {
    pub fn builder() -> SimulatedProviderBuilder {
        SimulatedProviderBuilder {
            settings: Settings {
                page_size: DEFAULT_SIMULATED_PAGE_SIZE,
                polls_to_complete: DEFAULT_SIMULATED_POLLS_TO_COMPLETE,
                failing_regions: HashSet::new(),
                transient_every: None,
                account_id: DEFAULT_SIMULATED_ACCOUNT_ID.to_string(),
            },
        }
    }

    /// Build a provider from the `simulation` section, seeds included.
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        let mut builder = Self::builder()
            .page_size(cfg.get_page_size())
            .polls_to_complete(cfg.get_polls_to_complete())
            .account_id(cfg.get_account_id());
        for region in &cfg.failing_regions {
            builder = builder.failing_region(region);
        }
        if let Some(every) = cfg.transient_every {
            builder = builder.transient_every(every);
        }
        let provider = builder.build();
        for seed in &cfg.seed {
            provider.seed_version(&seed.region, &seed.project, &seed.version, seed.status);
        }
        provider
    }

    // A poisoned lock only means a test panicked mid-call; the world is still usable.
    fn lock(&self) -> MutexGuard<'_, World> {
        self.world
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a project unless one with that name exists; returns its identifier.
    pub fn seed_project(&self, region: &str, project: &str) -> String {
        let mut world = self.lock();
        let timestamp = world.tick();
        let account = self.settings.account_id.clone();
        let region_world = world.region(region);
        if let Some(existing) = region_world.projects.iter().find(|p| p.name == project) {
            return existing.arn.clone();
        }
        let arn = format_project_arn(region, &account, project, timestamp);
        region_world.projects.push(SimProject {
            name: project.to_string(),
            arn: arn.clone(),
            versions: Vec::new(),
        });
        arn
    }

    /// Place a version in the given status; returns its identifier.
    pub fn seed_version(&self, region: &str, project: &str, version: &str, status: JobStatus) -> String {
        self.seed_project(region, project);
        let mut world = self.lock();
        let timestamp = world.tick();
        let account = self.settings.account_id.clone();
        let polls = self.settings.polls_to_complete;
        let arn = format_version_arn(region, &account, project, version, timestamp);
        let region_world = world.region(region);
        if let Some(sim_project) = region_world.projects.iter_mut().find(|p| p.name == project) {
            sim_project.versions.retain(|v| v.name != version);
            sim_project.versions.push(SimVersion {
                name: version.to_string(),
                arn: arn.clone(),
                status,
                output_location: None,
                remaining: polls,
                script: VecDeque::new(),
            });
        }
        arn
    }

    /// Answers returned by the next describe calls of a version, before its
    /// normal progression resumes.
    pub fn script_describes(
        &self,
        region: &str,
        project: &str,
        version: &str,
        responses: Vec<Result<JobStatus, RemoteError>>,
    ) {
        let mut world = self.lock();
        let found = world
            .region(region)
            .projects
            .iter_mut()
            .filter(|p| p.name == project)
            .flat_map(|p| p.versions.iter_mut())
            .find(|v| v.name == version);
        if let Some(sim_version) = found {
            sim_version.script.extend(responses);
        }
    }

    /// The next call of this kind in the region fails with `error`. Stacks.
    pub fn fail_next(&self, region: &str, call: SimCall, error: RemoteError) {
        self.lock()
            .region(region)
            .failures
            .entry(call)
            .or_default()
            .push_back(error);
    }

    /// Refuse to hand out clients for a region.
    pub fn make_unavailable(&self, region: &str) {
        self.lock().unavailable.insert(region.to_string());
    }

    pub fn calls(&self, region: &str) -> CallCounts {
        self.lock().region(region).calls.clone()
    }

    pub fn version_status(&self, region: &str, project: &str, version: &str) -> Option<JobStatus> {
        self.lock()
            .region(region)
            .projects
            .iter()
            .filter(|p| p.name == project)
            .flat_map(|p| p.versions.iter())
            .find(|v| v.name == version)
            .map(|v| v.status)
    }

    pub fn version_count(&self, region: &str, project: &str) -> usize {
        self.lock()
            .region(region)
            .projects
            .iter()
            .filter(|p| p.name == project)
            .map(|p| p.versions.len())
            .sum()
    }

    pub fn has_project(&self, region: &str, project: &str) -> bool {
        self.lock()
            .region(region)
            .projects
            .iter()
            .any(|p| p.name == project)
    }
}

impl ClientFactory for SimulatedProvider {
    fn client_for(&self, target: &RegionTarget) -> Result<Arc<dyn RemoteJobClient>, RemoteError> {
        if self.lock().unavailable.contains(&target.region) {
            return Err(RemoteError::Provider(format!(
                "no endpoint for region {}",
                target.region
            )));
        }
        Ok(Arc::new(SimulatedJobClient {
            region: target.region.clone(),
            provider: self.clone(),
        }))
    }
}

/// A client bound to one region of a [`SimulatedProvider`].
pub struct SimulatedJobClient {
    region: String,
    provider: SimulatedProvider,
}

fn page<T>(items: Vec<T>, token: Option<String>, page_size: usize) -> Result<Page<T>, RemoteError> {
    let offset = match token {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| RemoteError::Provider(format!("invalid pagination token '{}'", token)))?,
        None => 0,
    };
    let total = items.len();
    let end = offset.saturating_add(page_size).min(total);
    let next_token = (end < total).then(|| end.to_string());
    let items = items.into_iter().skip(offset).take(end.saturating_sub(offset)).collect();
    Ok(Page { items, next_token })
}

#[async_trait]
impl RemoteJobClient for SimulatedJobClient {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_projects(&self, next_token: Option<String>) -> Result<Page<ProjectRef>, RemoteError> {
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::ListProjects)?;
        let projects = region.projects.iter().map(SimProject::to_ref).collect();
        page(projects, next_token, self.provider.settings.page_size)
    }

    async fn list_versions(
        &self,
        project: &ProjectRef,
        next_token: Option<String>,
    ) -> Result<Page<VersionRef>, RemoteError> {
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::ListVersions)?;
        let index = region
            .project_index(&project.arn)
            .ok_or_else(|| RemoteError::NotFound(project.arn.clone()))?;
        let versions = region.projects[index]
            .versions
            .iter()
            .map(SimVersion::to_ref)
            .collect();
        page(versions, next_token, self.provider.settings.page_size)
    }

    async fn create_project(&self, name: &str) -> Result<ProjectRef, RemoteError> {
        let mut world = self.provider.lock();
        let timestamp = world.tick();
        let region = world.region(&self.region);
        region.enter(SimCall::CreateProject)?;
        if region.projects.iter().any(|p| p.name == name) {
            return Err(RemoteError::AlreadyExists(name.to_string()));
        }
        let project = SimProject {
            name: name.to_string(),
            arn: format_project_arn(&self.region, &self.provider.settings.account_id, name, timestamp),
            versions: Vec::new(),
        };
        let created = project.to_ref();
        region.projects.push(project);
        Ok(created)
    }

    async fn create_version(
        &self,
        project: &ProjectRef,
        version_name: &str,
        training: &TrainingSpec,
    ) -> Result<VersionRef, RemoteError> {
        let settings = &self.provider.settings;
        let mut world = self.provider.lock();
        let timestamp = world.tick();
        let region = world.region(&self.region);
        region.enter(SimCall::CreateVersion)?;
        let index = region
            .project_index(&project.arn)
            .ok_or_else(|| RemoteError::NotFound(project.arn.clone()))?;
        let sim_project = &mut region.projects[index];
        if sim_project.versions.iter().any(|v| v.name == version_name) {
            return Err(RemoteError::AlreadyExists(version_name.to_string()));
        }
        let version = SimVersion {
            name: version_name.to_string(),
            arn: format_version_arn(
                &self.region,
                &settings.account_id,
                &sim_project.name,
                version_name,
                timestamp,
            ),
            status: JobStatus::Starting,
            output_location: Some(training.output_location.clone()),
            remaining: settings.polls_to_complete,
            script: VecDeque::new(),
        };
        let created = version.to_ref();
        sim_project.versions.push(version);
        Ok(created)
    }

    async fn describe_version(&self, handle: &JobHandle) -> Result<JobStatus, RemoteError> {
        let settings = &self.provider.settings;
        let failing = settings.failing_regions.contains(&self.region);
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::Describe)?;
        let describe_number = region.calls.describe;
        let (p, v) = region
            .locate(handle)
            .ok_or_else(|| RemoteError::NotFound(handle.version_arn.clone()))?;
        let version = &mut region.projects[p].versions[v];

        if let Some(scripted) = version.script.pop_front() {
            if let Ok(status) = &scripted {
                version.status = *status;
            }
            return scripted;
        }

        if let Some(every) = settings.transient_every {
            if describe_number % every == 0 {
                return Err(RemoteError::Transient("rate exceeded".to_string()));
            }
        }

        version.remaining = version.remaining.saturating_sub(1);
        let done = version.remaining == 0;
        let next = match version.status {
            JobStatus::Pending | JobStatus::Starting | JobStatus::TrainingInProgress => {
                if failing {
                    Some(JobStatus::Failed)
                } else if done {
                    Some(JobStatus::TrainingCompleted)
                } else {
                    Some(JobStatus::TrainingInProgress)
                }
            }
            JobStatus::Stopping if done => Some(JobStatus::Stopped),
            JobStatus::Deleting if done => None,
            other => Some(other),
        };
        match next {
            Some(status) => {
                version.status = status;
                Ok(status)
            }
            None => {
                region.projects[p].versions.remove(v);
                Err(RemoteError::NotFound(handle.version_arn.clone()))
            }
        }
    }

    async fn stop_version(&self, handle: &JobHandle) -> Result<(), RemoteError> {
        let polls = self.provider.settings.polls_to_complete;
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::Stop)?;
        let (p, v) = region
            .locate(handle)
            .ok_or_else(|| RemoteError::NotFound(handle.version_arn.clone()))?;
        let version = &mut region.projects[p].versions[v];
        if !matches!(version.status, JobStatus::Stopping | JobStatus::Stopped) {
            version.status = JobStatus::Stopping;
            version.remaining = polls;
        }
        Ok(())
    }

    async fn delete_version(&self, handle: &JobHandle) -> Result<(), RemoteError> {
        let polls = self.provider.settings.polls_to_complete;
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::DeleteVersion)?;
        let (p, v) = region
            .locate(handle)
            .ok_or_else(|| RemoteError::NotFound(handle.version_arn.clone()))?;
        let version = &mut region.projects[p].versions[v];
        if version.status != JobStatus::Deleting {
            version.status = JobStatus::Deleting;
            version.remaining = polls;
        }
        Ok(())
    }

    async fn delete_project(&self, project: &ProjectRef) -> Result<(), RemoteError> {
        let mut world = self.provider.lock();
        let region = world.region(&self.region);
        region.enter(SimCall::DeleteProject)?;
        let index = region
            .project_index(&project.arn)
            .ok_or_else(|| RemoteError::NotFound(project.arn.clone()))?;
        let remaining = region.projects[index].versions.len();
        if remaining > 0 {
            return Err(RemoteError::Provider(format!(
                "project {} still has {} versions",
                project.name, remaining
            )));
        }
        region.projects.remove(index);
        Ok(())
    }
}
