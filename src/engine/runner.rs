// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{Config, RegionRegistry};
use crate::engine::{FanOutCoordinator, WorkflowFactory};
use crate::errors::{SinkError, ValidationError, WorkflowError};
use crate::model::{
    AggregatedResult, InventoryInput, Notification, RegionTarget, WorkflowReport, WorkflowRequest,
};
use crate::observability::messages::validation::InputRejected;
use crate::observability::messages::workflow::{
    NotificationFailed, NotificationPublished, WorkflowCancelled, WorkflowCompleted,
    WorkflowStarted, WorkflowTimedOut,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ClientFactory, NotificationSink, RegionWorkflow, RemoteJobClient};
use crate::workflows::{describe_region, RegionInventory};

/// Identifier of a submitted workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(RunId)
            .map_err(|_| WorkflowError::UnknownRun(s.to_string()))
    }
}

/// Where a submitted run is.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Running,
    Completed(WorkflowReport),
    Failed(String),
    TimedOut,
    Cancelled,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

struct RunRecord {
    sequence: u64,
    status: watch::Sender<RunStatus>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RunTable {
    next_sequence: u64,
    records: HashMap<RunId, RunRecord>,
}

impl RunTable {
    fn insert(&mut self, run_id: RunId, status: watch::Sender<RunStatus>, cancel: CancellationToken) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.insert(
            run_id,
            RunRecord {
                sequence,
                status,
                cancel,
            },
        );
    }

    /// Drop the oldest finished runs beyond `retained`. Running runs stay.
    fn evict_finished(&mut self, retained: usize) {
        let mut finished: Vec<(u64, RunId)> = self
            .records
            .iter()
            .filter(|(_, record)| record.status.borrow().is_finished())
            .map(|(id, record)| (record.sequence, *id))
            .collect();
        if finished.len() <= retained {
            return;
        }
        finished.sort_unstable_by_key(|(sequence, _)| *sequence);
        let excess = finished.len() - retained;
        for (_, run_id) in finished.into_iter().take(excess) {
            self.records.remove(&run_id);
        }
    }

    fn get(&self, run_id: &RunId) -> Result<&RunRecord, WorkflowError> {
        self.records
            .get(run_id)
            .ok_or_else(|| WorkflowError::UnknownRun(run_id.to_string()))
    }
}

// A request that passed validation, with its regions and workflow settled.
struct PreparedRun {
    regions: Vec<RegionTarget>,
    workflow: Arc<dyn RegionWorkflow>,
}

struct RunnerInner {
    config: Config,
    registry: RegionRegistry,
    factory: Arc<dyn ClientFactory>,
    sink: Arc<dyn NotificationSink>,
    coordinator: FanOutCoordinator,
    runs: Mutex<RunTable>,
}

/// Entry point of the orchestrator.
///
/// Validates a workflow request, fans it out over its regions, folds the
/// outcomes into a [`WorkflowReport`] and publishes exactly one notification
/// per finished workflow. A run is bounded by the configured workflow timeout
/// and can be cancelled; both terminate every branch still in flight.
///
/// Finished submitted runs stay queryable until more than
/// `retained_runs` of them have piled up; the oldest are evicted first.
///
/// Cloning is cheap; clones share the run registry.
#[derive(Clone)]
pub struct WorkflowRunner {
    inner: Arc<RunnerInner>,
}

impl WorkflowRunner {
    pub fn new(
        config: Config,
        registry: RegionRegistry,
        factory: Arc<dyn ClientFactory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let coordinator = FanOutCoordinator::new(config.max_concurrency);
        Self {
            inner: Arc::new(RunnerInner {
                config,
                registry,
                factory,
                sink,
                coordinator,
                runs: Mutex::new(RunTable::default()),
            }),
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Run a workflow to completion.
    pub async fn run(&self, request: WorkflowRequest) -> Result<WorkflowReport, WorkflowError> {
        let prepared = self.inner.prepare(&request)?;
        self.inner
            .execute(RunId::new(), prepared, CancellationToken::new())
            .await
    }

    /// Start a workflow in the background.
    ///
    /// Input validation happens before this returns: a rejected request never
    /// gets a run id.
    pub async fn submit(&self, request: WorkflowRequest) -> Result<RunId, WorkflowError> {
        let prepared = self.inner.prepare(&request)?;
        let run_id = RunId::new();
        let cancel = CancellationToken::new();
        let (status, _) = watch::channel(RunStatus::Running);

        {
            let mut runs = self.inner.runs.lock().await;
            runs.evict_finished(self.inner.config.retained_runs());
            runs.insert(run_id, status, cancel.clone());
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let finished = match inner.execute(run_id, prepared, cancel).await {
                Ok(report) => RunStatus::Completed(report),
                Err(WorkflowError::TimedOut(_)) => RunStatus::TimedOut,
                Err(WorkflowError::Cancelled) => RunStatus::Cancelled,
                Err(err) => RunStatus::Failed(err.to_string()),
            };
            if let Ok(record) = inner.runs.lock().await.get(&run_id) {
                record.status.send_replace(finished);
            }
        });

        Ok(run_id)
    }

    pub async fn status(&self, run_id: &RunId) -> Result<RunStatus, WorkflowError> {
        let runs = self.inner.runs.lock().await;
        let status = runs.get(run_id)?.status.borrow().clone();
        Ok(status)
    }

    /// Wait until a submitted run has finished and return its final status.
    pub async fn wait(&self, run_id: &RunId) -> Result<RunStatus, WorkflowError> {
        let mut receiver = {
            let runs = self.inner.runs.lock().await;
            runs.get(run_id)?.status.subscribe()
        };
        let status = receiver
            .wait_for(RunStatus::is_finished)
            .await
            .map_err(|_| WorkflowError::Internal {
                message: format!("run {} lost its status channel", run_id),
            })?
            .clone();
        Ok(status)
    }

    /// Force-terminate a submitted run. Cancelling a finished run is a no-op.
    pub async fn cancel(&self, run_id: &RunId) -> Result<(), WorkflowError> {
        let runs = self.inner.runs.lock().await;
        runs.get(run_id)?.cancel.cancel();
        Ok(())
    }

    /// List projects and versions in every region. Nothing is polled and no
    /// notification is sent.
    pub async fn describe(&self, input: InventoryInput) -> Result<Vec<RegionInventory>, WorkflowError> {
        let regions = self.inner.registry.resolve(&input.regions);
        if regions.is_empty() {
            let errors = vec![ValidationError::NoRegions];
            InputRejected {
                workflow: "describe",
                errors: &errors,
            }
            .log();
            return Err(WorkflowError::InvalidInput(errors));
        }

        let branches = self.inner.clients_for(regions)?;
        let names: Vec<String> = branches.iter().map(|(t, _)| t.region.clone()).collect();
        let filter = input.project_name;
        let budget = self.inner.config.workflow_timeout();

        let listing = self.inner.coordinator.fan_out(
            branches,
            move |(_, client): (RegionTarget, Arc<dyn RemoteJobClient>)| {
                let filter = filter.clone();
                async move { describe_region(client.as_ref(), filter.as_deref()).await }
            },
            |index, reason| RegionInventory::failed(&names[index], reason),
        );

        timeout(budget, listing)
            .await
            .map_err(|_| WorkflowError::TimedOut(budget))
    }
}

impl RunnerInner {
    fn prepare(&self, request: &WorkflowRequest) -> Result<PreparedRun, WorkflowError> {
        let regions = self.registry.resolve(request.input_regions());
        if let Err(errors) = request.validate(&regions) {
            InputRejected {
                workflow: request.kind().as_str(),
                errors: &errors,
            }
            .log();
            return Err(WorkflowError::InvalidInput(errors));
        }

        Ok(PreparedRun {
            regions,
            workflow: WorkflowFactory::from_request(&self.config, request, self.coordinator),
        })
    }

    // Every region gets its client before any branch starts.
    fn clients_for(
        &self,
        regions: Vec<RegionTarget>,
    ) -> Result<Vec<(RegionTarget, Arc<dyn RemoteJobClient>)>, WorkflowError> {
        regions
            .into_iter()
            .map(|target| {
                let client = self.factory.client_for(&target).map_err(|err| {
                    WorkflowError::ClientUnavailable {
                        region: target.region.clone(),
                        reason: err.to_string(),
                    }
                })?;
                Ok((target, client))
            })
            .collect()
    }

    async fn execute(
        &self,
        run_id: RunId,
        prepared: PreparedRun,
        cancel: CancellationToken,
    ) -> Result<WorkflowReport, WorkflowError> {
        let PreparedRun { regions, workflow } = prepared;
        let run_label = run_id.to_string();
        let kind = workflow.kind();
        let branches = self.clients_for(regions)?;

        let started = WorkflowStarted {
            run_id: &run_label,
            workflow: kind.as_str(),
            project: workflow.project_name(),
            region_count: branches.len(),
        };
        started.log();
        let span = started.span("workflow_run");

        async {
            let budget = self.config.workflow_timeout();
            let began = Instant::now();
            let fan_in = self.coordinator.run_workflow(Arc::clone(&workflow), branches);

            let result = tokio::select! {
                outcome = timeout(budget, fan_in) => match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        WorkflowTimedOut {
                            run_id: &run_label,
                            workflow: kind.as_str(),
                            timeout: budget,
                        }
                        .log();
                        return Err(WorkflowError::TimedOut(budget));
                    }
                },
                _ = cancel.cancelled() => {
                    WorkflowCancelled {
                        run_id: &run_label,
                        workflow: kind.as_str(),
                    }
                    .log();
                    return Err(WorkflowError::Cancelled);
                }
            };

            let failed = result.failed_regions().len();
            WorkflowCompleted {
                run_id: &run_label,
                workflow: kind.as_str(),
                succeeded: result.entries.len() - failed,
                failed,
                duration: began.elapsed(),
            }
            .log();

            let subject = workflow.subject(self.config.subject_prefix());
            let warnings = self.notify(&subject, &result).await;

            Ok(WorkflowReport {
                workflow: kind,
                project_name: workflow.project_name().to_string(),
                subject,
                result,
                warnings,
            })
        }
        .instrument(span)
        .await
    }

    /// Publish the single notification of a run. Failures become warnings.
    async fn notify(&self, subject: &str, result: &AggregatedResult) -> Vec<String> {
        let sink = self.sink.name();
        let published = match Notification::for_result(subject.to_string(), result) {
            Ok(notification) => self.sink.publish(&notification).await,
            Err(err) => Err(SinkError::from(err)),
        };

        match published {
            Ok(()) => {
                NotificationPublished { sink, subject }.log();
                Vec::new()
            }
            Err(err) => {
                NotificationFailed {
                    sink,
                    subject,
                    error: &err,
                }
                .log();
                vec![format!("notification via {} not delivered: {}", sink, err)]
            }
        }
    }
}
