// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Simulation Driver

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::sampler::NoiseSampler;
use crate::types::NodeMetrics;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Immutable full-grid snapshot. Replaced wholesale on every tick, so a
/// holder never sees a mix of two ticks.
pub type Snapshot = Arc<Vec<NodeMetrics>>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Running,
    Paused,
}

/// Owns the authoritative node collection and the tick schedule.
///
/// Time is supplied by the caller: [`advance`](Self::advance) fires a tick
/// when the next period boundary has passed. Pausing drops the pending
/// boundary; resuming schedules a fresh one a full period later, so missed
/// ticks are never replayed.
pub struct SimulationDriver<S: NoiseSampler> {
    nodes: Snapshot,
    state: RunState,
    traffic_load: f64,
    period_ms: i64,
    next_tick_at: Option<i64>,
    tick_count: u64,
    sampler: S,
}

impl<S: NoiseSampler> SimulationDriver<S> {
    /// Starts RUNNING with the first tick one period after `now`.
    pub fn new(
        nodes: Vec<NodeMetrics>,
        sampler: S,
        traffic_load: f64,
        period: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX).max(1);
        Self {
            nodes: Arc::new(nodes),
            state: RunState::Running,
            traffic_load: metrics::clamp_load(traffic_load),
            period_ms,
            next_tick_at: Some(now.timestamp_millis().saturating_add(period_ms)),
            tick_count: 0,
            sampler,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms as u64)
    }

    pub fn traffic_load(&self) -> f64 {
        self.traffic_load
    }

    /// Picked up by the next tick; does not recompute immediately.
    pub fn set_traffic_load(&mut self, load: f64) {
        self.traffic_load = metrics::clamp_load(load);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn next_tick_at(&self) -> Option<DateTime<Utc>> {
        self.next_tick_at.and_then(DateTime::from_timestamp_millis)
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.nodes)
    }

    pub fn nodes(&self) -> &[NodeMetrics] {
        &self.nodes
    }

    /// Copy-on-write access for out-of-band edits between ticks.
    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<NodeMetrics> {
        Arc::make_mut(&mut self.nodes)
    }

    pub(crate) fn replace_nodes(&mut self, nodes: Vec<NodeMetrics>) {
        self.nodes = Arc::new(nodes);
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Paused {
            return;
        }
        self.state = RunState::Paused;
        self.next_tick_at = None;
        tracing::info!(ticks = self.tick_count, "simulation paused");
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.state == RunState::Running {
            return;
        }
        self.state = RunState::Running;
        self.next_tick_at = Some(now.timestamp_millis().saturating_add(self.period_ms));
        tracing::info!(ticks = self.tick_count, "simulation resumed");
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) -> RunState {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(now),
        }
        self.state
    }

    /// Run one generator step now. No-op while paused.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Snapshot> {
        if !self.is_running() {
            return None;
        }
        let next = metrics::generate(&self.nodes, self.traffic_load, &mut self.sampler, now);
        self.nodes = Arc::new(next);
        self.tick_count += 1;
        tracing::trace!(tick = self.tick_count, load = self.traffic_load, "grid tick");
        Some(self.snapshot())
    }

    /// Fire at most one tick if a period boundary has passed. Boundaries
    /// missed in between are skipped.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<Snapshot> {
        let due = self.next_tick_at?;
        let now_ms = now.timestamp_millis();
        if now_ms < due {
            return None;
        }
        let missed = now_ms.saturating_sub(due) / self.period_ms;
        let skip = (missed + 1).saturating_mul(self.period_ms);
        self.next_tick_at = Some(due.saturating_add(skip));
        if missed > 0 {
            tracing::debug!(missed, "skipping missed tick boundaries");
        }
        self.tick(now)
    }
}
