// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Metrics Generator

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::rounding::{from_decimal, round_decimal, round_dp, to_decimal};
use crate::sampler::NoiseSampler;
use crate::types::*;

// -- Recurrence constants --------------------------------------------------

const QUEUE_BASELINE: f64 = 1.1;
const QUEUE_LOAD_GAIN: f64 = 0.5;
const LATENCY_BASELINE_MS: f64 = 1.0;
const LATENCY_PER_PACKET_MS: f64 = 0.1;

pub const CONGESTED_LATENCY_MS: f64 = 15.0;
pub const CRITICAL_LATENCY_MS: f64 = 40.0;

const CORRECTION_LATENCY_MS: f64 = 2.0;
/// Correction fires when the roll lands above this (30% chance).
const CORRECTION_ROLL_THRESHOLD: f64 = 0.7;

const FLOW_BASELINE: f64 = 59.0;
const FLOW_AMPLITUDE: f64 = 10.0;
const FLOW_PERIOD_MS: f64 = 10_000.0;

const POTENTIAL_LATENCY_WEIGHT: f64 = 1.2;
const RISK_FACTOR: Decimal = dec!(0.58);

// -- Initial state ---------------------------------------------------------

const INITIAL_LATENCY_MS: f64 = 1.0;
const INITIAL_QUEUE_DEPTH: f64 = 1.0;
const INITIAL_BANDWIDTH: f64 = 50.0;
const INITIAL_FLOWS: u32 = 59;
const INITIAL_POTENTIAL: f64 = 43.27;
const INITIAL_RISK: f64 = 25.2;

/// The nine-node deployment the dashboard ships with.
pub fn default_roster() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new("n-01", "Alpha-Gateway", "eth0", Qdisc::Cake),
        NodeSpec::new("n-02", "Beta-Relay", "eth1", Qdisc::FqCodel),
        NodeSpec::new("n-03", "Gamma-Edge", "wlan0", Qdisc::FqCodel),
        NodeSpec::new("n-04", "Delta-Cluster", "eth2", Qdisc::Cake),
        NodeSpec::new("n-05", "Epsilon-Core", "eth3", Qdisc::FqCodel),
        NodeSpec::new("n-06", "Zeta-Mesh", "wlan1", Qdisc::Cake),
        NodeSpec::new("n-07", "Eta-Link", "bond0", Qdisc::FqCodel),
        NodeSpec::new("n-08", "Theta-Hub", "eth4", Qdisc::Cake),
        NodeSpec::new("n-09", "Iota-Bridge", "tun0", Qdisc::FqCodel),
    ]
}

/// Snapshot every node starts from before the first tick.
pub fn initial_snapshot(roster: &[NodeSpec], now: DateTime<Utc>) -> Vec<NodeMetrics> {
    roster.iter()
        .map(|spec| NodeMetrics {
            id: spec.id.clone(),
            name: spec.name.clone(),
            interface: spec.interface.clone(),
            qdisc: spec.qdisc,
            latency_ms: INITIAL_LATENCY_MS,
            queue_depth: INITIAL_QUEUE_DEPTH,
            packet_loss: 0.0,
            bandwidth_usage: INITIAL_BANDWIDTH,
            last_operator: Operator::J,
            status: NetworkStatus::Optimal,
            timestamp: now,
            active_flows: INITIAL_FLOWS,
            syntropic_potential: INITIAL_POTENTIAL,
            adoption_risk: INITIAL_RISK,
            stochastic_forcing: true,
        })
        .collect()
}

// -- Classification --------------------------------------------------------

/// Status is a function of latency alone; thresholds are exclusive lower bounds.
pub fn classify_status(latency_ms: f64) -> NetworkStatus {
    let mut status = NetworkStatus::Optimal;
    if latency_ms > CONGESTED_LATENCY_MS {
        status = NetworkStatus::Congested;
    }
    if latency_ms > CRITICAL_LATENCY_MS {
        status = NetworkStatus::Critical;
    }
    status
}

/// Recommended operator for a freshly generated node.
///
/// `roll` is only consulted when latency exceeds the correction threshold.
/// CONGESTED forces `O`. CRITICAL does not force anything and falls through
/// to the latency/coin rule.
pub fn recommend_operator(
    latency_ms: f64,
    status: NetworkStatus,
    roll: impl FnOnce() -> f64,
) -> Operator {
    let mut op = Operator::J;
    if latency_ms > CORRECTION_LATENCY_MS && roll() > CORRECTION_ROLL_THRESHOLD {
        op = Operator::C;
    }
    if status == NetworkStatus::Congested {
        op = Operator::O;
    }
    op
}

/// Φ = flows / (latency × 1.2), two decimals.
pub fn syntropic_potential(active_flows: u32, latency_ms: f64) -> f64 {
    let denom = latency_ms * POTENTIAL_LATENCY_WEIGHT;
    if denom <= 0.0 {
        return 0.0;
    }
    round_dp(active_flows as f64 / denom, 2)
}

/// Adoption risk = Φ × 0.58, one decimal.
pub fn adoption_risk(potential: f64) -> f64 {
    from_decimal(round_decimal(to_decimal(potential) * RISK_FACTOR, 1))
}

/// Shared slow sinusoid over wall-clock time; each node adds its own jitter.
fn flow_phase(now: DateTime<Utc>) -> f64 {
    FLOW_BASELINE + FLOW_AMPLITUDE * (now.timestamp_millis() as f64 / FLOW_PERIOD_MS).sin()
}

// -- Generator -------------------------------------------------------------

/// Produce the next snapshot from the previous one.
///
/// Output has the same ids in the same order as `previous`. Identity fields
/// and packet loss carry over; everything else is recomputed.
pub fn generate<S: NoiseSampler + ?Sized>(
    previous: &[NodeMetrics],
    traffic_load: f64,
    sampler: &mut S,
    now: DateTime<Utc>,
) -> Vec<NodeMetrics> {
    let load = clamp_load(traffic_load);
    let load_factor = load / 100.0;
    let phase = flow_phase(now);

    previous.iter()
        .map(|node| next_node(node, load_factor, phase, &mut *sampler, now))
        .collect()
}

fn next_node<S: NoiseSampler + ?Sized>(
    node: &NodeMetrics,
    load_factor: f64,
    phase: f64,
    sampler: &mut S,
    now: DateTime<Utc>,
) -> NodeMetrics {
    let noise = sampler.queue_noise();

    let queue_depth = round_dp(
        (QUEUE_BASELINE + load_factor * QUEUE_LOAD_GAIN + noise).max(0.0),
        1,
    );
    let latency_ms = round_dp(
        (LATENCY_BASELINE_MS + queue_depth * LATENCY_PER_PACKET_MS + noise.abs()).max(0.0),
        2,
    );

    let status = classify_status(latency_ms);
    let last_operator = recommend_operator(latency_ms, status, || sampler.correction_roll());

    let active_flows = (phase + sampler.flow_jitter()).floor().max(0.0) as u32;
    let potential = syntropic_potential(active_flows, latency_ms);
    let risk = adoption_risk(potential);

    let bandwidth_usage = round_dp(load_factor * 100.0 + sampler.bandwidth_jitter(), 1);

    NodeMetrics {
        latency_ms,
        queue_depth,
        bandwidth_usage,
        status,
        last_operator,
        timestamp: now,
        active_flows,
        syntropic_potential: potential,
        adoption_risk: risk,
        stochastic_forcing: true,
        ..node.clone()
    }
}

/// Traffic load is a percentage; NaN collapses to idle.
pub fn clamp_load(traffic_load: f64) -> f64 {
    if traffic_load.is_nan() {
        0.0
    } else {
        traffic_load.clamp(0.0, 100.0)
    }
}

// -- Aggregates ------------------------------------------------------------

/// Grid-wide gauges shown above the node cards.
pub fn summarize(nodes: &[NodeMetrics]) -> GridSummary {
    if nodes.is_empty() {
        return GridSummary::default();
    }
    let n = nodes.len() as f64;
    let potential: f64 = nodes.iter().map(|x| x.syntropic_potential).sum();
    let flows: f64 = nodes.iter().map(|x| x.active_flows as f64).sum();
    let risk: f64 = nodes.iter().map(|x| x.adoption_risk).sum();
    let count = |s: NetworkStatus| nodes.iter().filter(|x| x.status == s).count();

    GridSummary {
        node_count: nodes.len(),
        avg_potential: round_dp(potential / n, 2),
        avg_flows: (flows / n).floor() as u32,
        avg_risk: round_dp(risk / n, 1),
        optimal: count(NetworkStatus::Optimal),
        congested: count(NetworkStatus::Congested),
        critical: count(NetworkStatus::Critical),
    }
}
