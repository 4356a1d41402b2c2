// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::errors::FailureCause;
use crate::model::{AggregatedResult, RegionResult, RegionTarget};
use crate::observability::messages::workflow::BranchAborted;
use crate::observability::messages::StructuredLog;
use crate::traits::{RegionWorkflow, RemoteJobClient};

/// Fan-out/fan-in over independent branches.
///
/// Every branch runs as its own task. Results are collected into slots keyed
/// by input index, so the output order is the input order no matter which
/// branch finishes first. A branch task that panics or is aborted still
/// yields an entry, built by the caller's `on_abort`.
///
/// Dropping the future returned by [`fan_out`](Self::fan_out) drops its
/// `JoinSet`, which aborts every branch still running.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanOutCoordinator {
    max_concurrency: Option<usize>,
}

impl FanOutCoordinator {
    /// `None` runs every branch at once.
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self { max_concurrency }
    }

    pub async fn fan_out<I, O, F, Fut, A>(&self, items: Vec<I>, branch: F, on_abort: A) -> Vec<O>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = O> + Send + 'static,
        O: Send + 'static,
        A: Fn(usize, &str) -> O,
    {
        let total = items.len();
        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let mut set = JoinSet::new();
        for (index, item) in items.into_iter().enumerate() {
            let work = branch(item);
            let semaphore = semaphore.clone();
            set.spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                (index, work.await)
            });
        }

        let mut slots: Vec<Option<O>> = (0..total).map(|_| None).collect();
        let mut aborted = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(err) => {
                    let reason = err.to_string();
                    BranchAborted { reason: &reason }.log();
                    aborted.push(reason);
                }
            }
        }

        let reason = if aborted.is_empty() {
            "branch ended without a result".to_string()
        } else {
            aborted.join("; ")
        };
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| on_abort(index, &reason)))
            .collect()
    }

    /// One region branch per target, folded into the aggregated result.
    pub async fn run_workflow(
        &self,
        workflow: Arc<dyn RegionWorkflow>,
        branches: Vec<(RegionTarget, Arc<dyn RemoteJobClient>)>,
    ) -> AggregatedResult {
        let regions: Vec<String> = branches.iter().map(|(t, _)| t.region.clone()).collect();
        let entries = self
            .fan_out(
                branches,
                move |(target, client): (RegionTarget, Arc<dyn RemoteJobClient>)| {
                    let workflow = Arc::clone(&workflow);
                    async move { workflow.run_region(target, client).await }
                },
                |index, reason| {
                    RegionResult::failed(&regions[index], &FailureCause::Aborted(reason.to_string()))
                },
            )
            .await;
        AggregatedResult::new(entries)
    }
}
