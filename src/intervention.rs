// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Manual Intervention

use chrono::{DateTime, Utc};

use crate::log::{LogRecorder, OperatorLog, MANUAL_INTERVENTION_MESSAGE};
use crate::types::{LogEntry, NodeMetrics, Operator};

/// Apply a hand-picked operator to one node, bypassing the generator.
///
/// Always appends one manual log entry. Sets the node's last operator; `R`
/// also flushes its queue to zero. No other field is touched. An unknown id
/// leaves the nodes unchanged. Returns whether a node matched.
pub fn apply_operator(
    nodes: &mut [NodeMetrics],
    log: &mut OperatorLog,
    recorder: &mut LogRecorder,
    node_id: &str,
    operator: Operator,
    now: DateTime<Utc>,
) -> bool {
    let entry: LogEntry = recorder.record(node_id, operator, MANUAL_INTERVENTION_MESSAGE, false, now);
    log.append(entry);

    let Some(node) = nodes.iter_mut().find(|n| n.id == node_id) else {
        tracing::debug!(node_id, %operator, "intervention on unknown node ignored");
        return false;
    };
    node.last_operator = operator;
    if operator == Operator::R {
        node.queue_depth = 0.0;
    }
    tracing::info!(node_id, %operator, "manual intervention applied");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{default_roster, generate, initial_snapshot};
    use crate::sampler::RngSampler;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fixture() -> (Vec<NodeMetrics>, OperatorLog, LogRecorder) {
        let nodes = generate(
            &initial_snapshot(&default_roster(), now()),
            70.0,
            &mut RngSampler::seeded(11),
            now(),
        );
        (nodes, OperatorLog::new(), LogRecorder::seeded(5))
    }

    #[test]
    fn reset_flushes_queue() {
        let (mut nodes, mut log, mut rec) = fixture();
        let before = nodes[2].clone();
        assert!(apply_operator(&mut nodes, &mut log, &mut rec, "n-03", Operator::R, now()));

        let after = &nodes[2];
        assert_eq!(after.queue_depth, 0.0);
        assert_eq!(after.last_operator, Operator::R);
        assert_eq!(after.latency_ms, before.latency_ms);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.status, before.status);

        assert_eq!(log.len(), 1);
        let e = log.last().unwrap();
        assert!(!e.automated);
        assert_eq!(e.node_id, "n-03");
        assert_eq!(e.operator, Operator::R);
    }

    #[test]
    fn correct_and_optimize_leave_queue_alone() {
        let (mut nodes, mut log, mut rec) = fixture();
        let q = nodes[0].queue_depth;
        apply_operator(&mut nodes, &mut log, &mut rec, "n-01", Operator::C, now());
        assert_eq!(nodes[0].queue_depth, q);
        assert_eq!(nodes[0].last_operator, Operator::C);
        apply_operator(&mut nodes, &mut log, &mut rec, "n-01", Operator::O, now());
        assert_eq!(nodes[0].queue_depth, q);
        assert_eq!(nodes[0].last_operator, Operator::O);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn unknown_node_still_logged() {
        let (mut nodes, mut log, mut rec) = fixture();
        let before = nodes.clone();
        assert!(!apply_operator(&mut nodes, &mut log, &mut rec, "n-99", Operator::R, now()));
        assert_eq!(nodes, before);
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().node_id, "n-99");
    }

    #[test]
    fn other_nodes_untouched() {
        let (mut nodes, mut log, mut rec) = fixture();
        let before = nodes.clone();
        apply_operator(&mut nodes, &mut log, &mut rec, "n-05", Operator::R, now());
        for (i, (a, b)) in before.iter().zip(&nodes).enumerate() {
            if i != 4 {
                assert_eq!(a, b);
            }
        }
    }
}
