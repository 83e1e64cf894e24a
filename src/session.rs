// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Session State

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::advisory::{ANALYZING_MESSAGE, IDLE_MESSAGE};
use crate::clock::{Clock, SystemClock};
use crate::config::GridConfig;
use crate::driver::{RunState, SimulationDriver, Snapshot};
use crate::intervention;
use crate::log::{LogRecorder, OperatorLog};
use crate::metrics;
use crate::sampler::{NoiseSampler, RngSampler};
use crate::types::{GridSummary, NodeMetrics, Operator};

/// A snapshot handed to the advisory service. The result is applied
/// whenever it arrives, regardless of how far the grid has moved since.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub id: u64,
    pub snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct AdvisorySlot {
    text: Option<String>,
    in_flight: HashSet<u64>,
    issued: u64,
    last_completed: Option<u64>,
}

/// Everything one dashboard session holds: the driver with its node
/// collection, the operator log and the advisory result slot.
///
/// All mutation goes through `&mut self`, so ticks, interventions and
/// advisory completions are serialized by whoever owns the session.
pub struct GridSession {
    driver: SimulationDriver<Box<dyn NoiseSampler>>,
    log: OperatorLog,
    recorder: LogRecorder,
    clock: Box<dyn Clock>,
    advisory: AdvisorySlot,
}

impl GridSession {
    /// Wall-clock session. Seeded when the config carries a seed.
    pub fn new(config: &GridConfig) -> Self {
        let (sampler, recorder): (Box<dyn NoiseSampler>, LogRecorder) = match config.seed {
            Some(seed) => (
                Box::new(RngSampler::seeded(seed)),
                LogRecorder::seeded(seed.wrapping_add(1)),
            ),
            None => (Box::new(RngSampler::from_entropy()), LogRecorder::from_entropy()),
        };
        Self::with_parts(config, sampler, recorder, Box::new(SystemClock))
    }

    pub fn with_parts(
        config: &GridConfig,
        sampler: Box<dyn NoiseSampler>,
        mut recorder: LogRecorder,
        clock: Box<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let nodes = metrics::initial_snapshot(&config.nodes, now);
        let driver = SimulationDriver::new(
            nodes,
            sampler,
            config.traffic_load,
            config.tick_period,
            now,
        );

        let mut log = match config.log_capacity {
            Some(cap) => OperatorLog::with_capacity(cap),
            None => OperatorLog::new(),
        };
        log.extend(recorder.deployment_entries(now));

        tracing::info!(
            nodes = config.nodes.len(),
            load = config.traffic_load,
            period_ms = config.tick_period.as_millis() as u64,
            "grid session started"
        );

        Self { driver, log, recorder, clock, advisory: AdvisorySlot::default() }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -- Driver ------------------------------------------------------------

    /// Fire a tick if the period boundary has passed.
    pub fn advance(&mut self) -> Option<Snapshot> {
        let now = self.clock.now();
        self.driver.advance(now)
    }

    /// Tick immediately (timer-driven callers). No-op while paused.
    pub fn tick(&mut self) -> Option<Snapshot> {
        let now = self.clock.now();
        self.driver.tick(now)
    }

    pub fn run_state(&self) -> RunState {
        self.driver.state()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn toggle_running(&mut self) -> RunState {
        let now = self.clock.now();
        self.driver.toggle(now)
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    pub fn resume(&mut self) {
        let now = self.clock.now();
        self.driver.resume(now);
    }

    pub fn traffic_load(&self) -> f64 {
        self.driver.traffic_load()
    }

    pub fn set_traffic_load(&mut self, load: f64) {
        self.driver.set_traffic_load(load);
    }

    pub fn tick_period(&self) -> Duration {
        self.driver.period()
    }

    pub fn tick_count(&self) -> u64 {
        self.driver.tick_count()
    }

    pub fn nodes(&self) -> &[NodeMetrics] {
        self.driver.nodes()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.driver.snapshot()
    }

    pub fn summary(&self) -> GridSummary {
        metrics::summarize(self.driver.nodes())
    }

    /// Reinstate the roster's initial telemetry, keeping the log.
    pub fn reset_nodes(&mut self, config: &GridConfig) {
        let now = self.clock.now();
        self.driver.replace_nodes(metrics::initial_snapshot(&config.nodes, now));
    }

    // -- Interventions and log ---------------------------------------------

    pub fn apply_operator(&mut self, node_id: &str, operator: Operator) -> bool {
        let now = self.clock.now();
        // Borrow-split: nodes live in the driver, log/recorder on self.
        let Self { driver, log, recorder, .. } = self;
        intervention::apply_operator(driver.nodes_mut(), log, recorder, node_id, operator, now)
    }

    pub fn logs(&self) -> &OperatorLog {
        &self.log
    }

    // -- Advisory slot -----------------------------------------------------

    pub fn begin_analysis(&mut self) -> AnalysisRequest {
        self.advisory.issued += 1;
        self.advisory.in_flight.insert(self.advisory.issued);
        self.advisory.text = Some(ANALYZING_MESSAGE.to_string());
        AnalysisRequest { id: self.advisory.issued, snapshot: self.snapshot() }
    }

    /// Last completion wins, whatever order requests were issued in.
    ///
    /// Ids that were never issued or already completed are ignored and
    /// return `false`.
    pub fn complete_analysis(&mut self, request_id: u64, text: String) -> bool {
        if !self.advisory.in_flight.remove(&request_id) {
            tracing::debug!(request_id, "ignoring completion for unknown analysis request");
            return false;
        }
        self.advisory.last_completed = Some(request_id);
        self.advisory.text = Some(text);
        true
    }

    pub fn analysis_text(&self) -> &str {
        self.advisory.text.as_deref().unwrap_or(IDLE_MESSAGE)
    }

    pub fn is_analyzing(&self) -> bool {
        !self.advisory.in_flight.is_empty()
    }

    pub fn last_completed_analysis(&self) -> Option<u64> {
        self.advisory.last_completed
    }
}
