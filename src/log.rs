// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Operator Log

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{LogEntry, Operator};

const ID_SUFFIX_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub const MANUAL_INTERVENTION_MESSAGE: &str = "Manual Governance Intervention";

/// Creates immutable log entries with session-unique ids.
pub struct LogRecorder {
    rng: ChaCha8Rng,
    sequence: u64,
}

impl LogRecorder {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng, sequence: 0 }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Build a new entry. The caller appends it to an [`OperatorLog`].
    pub fn record(
        &mut self,
        node_id: &str,
        operator: Operator,
        message: &str,
        automated: bool,
        now: DateTime<Utc>,
    ) -> LogEntry {
        let seq = self.sequence;
        self.sequence += 1;
        LogEntry {
            id: format!("{:04x}-{}", seq, self.random_suffix()),
            timestamp: now,
            node_id: node_id.to_string(),
            operator,
            message: message.to_string(),
            automated,
        }
    }

    fn random_suffix(&mut self) -> String {
        (0..ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }

    /// Entries written when the grid is first deployed.
    pub fn deployment_entries(&mut self, now: DateTime<Utc>) -> Vec<LogEntry> {
        vec![
            self.record("GRID", Operator::J, "Multi-Node Grid Deployment Initiated", true, now),
            self.record("GRID", Operator::C, "Stochastic Forcing: ENABLED", true, now),
            self.record("GRID", Operator::H, "Sovereign Mode: ACTIVE", true, now),
            self.record("system", Operator::M, "Target Benchmarks: 2050 Aligned", true, now),
        ]
    }
}

// ─── OperatorLog ─────────────────────────────────────────────────────────────

/// Append-only log, oldest first.
///
/// Unbounded by default. With a capacity it behaves as a ring buffer and
/// drops the oldest entry on overflow; entries still present are never
/// modified.
#[derive(Debug, Clone, Default)]
pub struct OperatorLog {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
    evicted: u64,
}

impl OperatorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the log without reserving storage up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: Some(capacity.max(1)),
            evicted: 0,
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        if let Some(cap) = self.capacity {
            while self.entries.len() >= cap {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        self.entries.push_back(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.append(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Number of entries dropped by the ring buffer.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn ids_are_unique() {
        let mut rec = LogRecorder::seeded(1);
        let ids: HashSet<String> = (0..1000)
            .map(|_| rec.record("n-01", Operator::R, "x", false, now()).id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn record_carries_fields() {
        let mut rec = LogRecorder::seeded(1);
        let e = rec.record("n-04", Operator::O, MANUAL_INTERVENTION_MESSAGE, false, now());
        assert_eq!(e.node_id, "n-04");
        assert_eq!(e.operator, Operator::O);
        assert_eq!(e.message, "Manual Governance Intervention");
        assert!(!e.automated);
        assert_eq!(e.timestamp, now());
    }

    #[test]
    fn deployment_entries_are_automated() {
        let mut rec = LogRecorder::seeded(1);
        let entries = rec.deployment_entries(now());
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.automated));
        let ops: Vec<Operator> = entries.iter().map(|e| e.operator).collect();
        assert_eq!(ops, vec![Operator::J, Operator::C, Operator::H, Operator::M]);
        assert_eq!(entries[3].node_id, "system");
    }

    #[test]
    fn unbounded_log_keeps_insertion_order() {
        let mut rec = LogRecorder::seeded(2);
        let mut log = OperatorLog::new();
        for i in 0..50 {
            log.append(rec.record(&format!("n-{i}"), Operator::J, "m", true, now()));
        }
        assert_eq!(log.len(), 50);
        assert_eq!(log.iter().next().unwrap().node_id, "n-0");
        assert_eq!(log.last().unwrap().node_id, "n-49");
        assert_eq!(log.evicted(), 0);
    }

    #[test]
    fn huge_capacity_does_not_reserve() {
        let mut rec = LogRecorder::seeded(2);
        let mut log = OperatorLog::with_capacity(usize::MAX);
        log.extend(rec.deployment_entries(now()));
        assert_eq!(log.len(), 4);
        assert_eq!(log.evicted(), 0);
    }

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut rec = LogRecorder::seeded(2);
        let mut log = OperatorLog::with_capacity(3);
        for i in 0..5 {
            log.append(rec.record(&format!("n-{i}"), Operator::J, "m", true, now()));
        }
        let ids: Vec<&str> = log.iter().map(|e| e.node_id.as_str()).collect();
        assert_eq!(ids, vec!["n-2", "n-3", "n-4"]);
        assert_eq!(log.evicted(), 2);
    }
}
