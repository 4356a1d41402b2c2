// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BUILD_POLL_INTERVAL_SECONDS, DEFAULT_DELETE_POLL_INTERVAL_SECONDS,
    DEFAULT_MAX_BUILD_TIME_MINUTES, DEFAULT_MAX_POLLS, DEFAULT_STOP_POLL_INTERVAL_SECONDS,
};
use crate::config::PolicyConfig;
use crate::model::WorkflowKind;
use std::time::Duration;

/// Wait interval and poll budget of one workflow variant.
///
/// The budget is either given directly (`max_polls`) or derived from a
/// maximum build time: `max_build_time_minutes * 60 / poll_interval_seconds`.
/// With a 180 minute budget and a 5 minute interval a branch gets 36 polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_polls: u32) -> Self {
        Self { interval, max_polls }
    }

    /// Resolve a policy section, filling gaps with the variant's defaults.
    ///
    /// Never returns a zero budget; validation reports that case before a
    /// policy is ever built.
    pub fn from_config(kind: WorkflowKind, cfg: &PolicyConfig) -> Self {
        Self {
            interval: Duration::from_secs(interval_seconds(kind, cfg)),
            max_polls: raw_max_polls(kind, cfg).clamp(1, u32::MAX as u64) as u32,
        }
    }

    /// Longest time a branch can spend waiting before it times out.
    ///
    /// Saturates instead of overflowing.
    pub fn budget(&self) -> Duration {
        self.interval
            .checked_mul(self.max_polls)
            .unwrap_or(Duration::MAX)
    }
}

pub(crate) fn interval_seconds(kind: WorkflowKind, cfg: &PolicyConfig) -> u64 {
    cfg.poll_interval_seconds.unwrap_or(match kind {
        WorkflowKind::Build => DEFAULT_BUILD_POLL_INTERVAL_SECONDS,
        WorkflowKind::Stop => DEFAULT_STOP_POLL_INTERVAL_SECONDS,
        WorkflowKind::Delete => DEFAULT_DELETE_POLL_INTERVAL_SECONDS,
    })
}

pub(crate) fn raw_max_polls(kind: WorkflowKind, cfg: &PolicyConfig) -> u64 {
    if let Some(max_polls) = cfg.max_polls {
        return max_polls as u64;
    }
    let interval = interval_seconds(kind, cfg);
    if interval == 0 {
        return 0;
    }
    match (cfg.max_build_time_minutes, kind) {
        (Some(minutes), _) => minutes.saturating_mul(60) / interval,
        (None, WorkflowKind::Build) => DEFAULT_MAX_BUILD_TIME_MINUTES * 60 / interval,
        (None, _) => DEFAULT_MAX_POLLS as u64,
    }
}

/// Per-branch budget in seconds. `None` when a value is too large to
/// compute it.
pub(crate) fn budget_seconds(kind: WorkflowKind, cfg: &PolicyConfig) -> Option<u64> {
    if let Some(minutes) = cfg.max_build_time_minutes {
        minutes.checked_mul(60)?;
    }
    interval_seconds(kind, cfg).checked_mul(raw_max_polls(kind, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_derived_from_build_time() {
        let cfg = PolicyConfig {
            poll_interval_seconds: Some(300),
            max_build_time_minutes: Some(180),
            max_polls: None,
        };
        let policy = PollPolicy::from_config(WorkflowKind::Build, &cfg);
        assert_eq!(policy.max_polls, 36);
        assert_eq!(policy.interval, Duration::from_secs(300));
    }

    #[test]
    fn test_defaults_per_workflow() {
        let cfg = PolicyConfig::default();
        let build = PollPolicy::from_config(WorkflowKind::Build, &cfg);
        let stop = PollPolicy::from_config(WorkflowKind::Stop, &cfg);
        let delete = PollPolicy::from_config(WorkflowKind::Delete, &cfg);

        assert_eq!(build.max_polls, 144);
        assert_eq!(build.budget(), Duration::from_secs(12 * 3600));
        assert_eq!(stop.max_polls, 50);
        assert_eq!(stop.interval, Duration::from_secs(300));
        assert_eq!(delete.max_polls, 50);
        assert_eq!(delete.interval, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_max_polls_wins() {
        let cfg = PolicyConfig {
            poll_interval_seconds: Some(60),
            max_build_time_minutes: Some(600),
            max_polls: Some(7),
        };
        assert_eq!(PollPolicy::from_config(WorkflowKind::Build, &cfg).max_polls, 7);
    }

    #[test]
    fn test_budget_shorter_than_interval_is_clamped_to_one_poll() {
        let cfg = PolicyConfig {
            poll_interval_seconds: Some(600),
            max_build_time_minutes: Some(5),
            max_polls: None,
        };
        assert_eq!(raw_max_polls(WorkflowKind::Build, &cfg), 0);
        assert_eq!(PollPolicy::from_config(WorkflowKind::Build, &cfg).max_polls, 1);
    }

    #[test]
    fn test_oversized_values_saturate_instead_of_overflowing() {
        let cfg = PolicyConfig {
            poll_interval_seconds: Some(u64::MAX / 2),
            max_build_time_minutes: None,
            max_polls: Some(3),
        };
        assert_eq!(budget_seconds(WorkflowKind::Stop, &cfg), None);
        assert_eq!(PollPolicy::from_config(WorkflowKind::Stop, &cfg).budget(), Duration::MAX);

        let cfg = PolicyConfig {
            poll_interval_seconds: Some(300),
            max_build_time_minutes: Some(u64::MAX),
            max_polls: None,
        };
        assert_eq!(budget_seconds(WorkflowKind::Build, &cfg), None);
        assert_eq!(PollPolicy::from_config(WorkflowKind::Build, &cfg).max_polls, u32::MAX);
    }
}
