// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Type Definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Operator ────────────────────────────────────────────────────────────────

/// Control action tag applied to a node, either recommended by the generator
/// or injected by an operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Join (observe)
    J,
    /// Correct (active queue management adjustment)
    C,
    /// Reset (force queue flush)
    R,
    /// Harmonize (quantum / flow adjustment)
    H,
    /// Optimize (ECN toggle)
    O,
    /// Mutate (interval shift)
    M,
}

impl Default for Operator {
    fn default() -> Self { Operator::J }
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::J, Operator::C, Operator::R, Operator::H, Operator::O, Operator::M,
    ];

    pub fn code(&self) -> char {
        match self {
            Self::J => 'J',
            Self::C => 'C',
            Self::R => 'R',
            Self::H => 'H',
            Self::O => 'O',
            Self::M => 'M',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::J => "JOIN",
            Self::C => "CORRECT",
            Self::R => "RESET",
            Self::H => "HARMONIZE",
            Self::O => "OPTIMIZE",
            Self::M => "MUTATE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::J => "Join/Observe",
            Self::C => "Correct/AQM",
            Self::R => "Reset/Flush",
            Self::H => "Harmonize/Quantum",
            Self::O => "Optimize/ECN",
            Self::M => "Mutate/Interval",
        }
    }

    /// Operators exposed on the manual injection controls.
    /// H and M are reserved variants; the dashboard only renders their badges.
    pub fn manually_injectable(&self) -> bool {
        matches!(self, Self::R | Self::C | Self::O)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; 4];
        f.pad(self.code().encode_utf8(&mut buf))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator code: {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "J" => Ok(Self::J),
            "C" => Ok(Self::C),
            "R" => Ok(Self::R),
            "H" => Ok(Self::H),
            "O" => Ok(Self::O),
            "M" => Ok(Self::M),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

// ─── Network Status ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkStatus {
    Optimal,
    Congested,
    Critical,
}

impl Default for NetworkStatus {
    fn default() -> Self { NetworkStatus::Optimal }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Optimal => "OPTIMAL",
            Self::Congested => "CONGESTED",
            Self::Critical => "CRITICAL",
        };
        f.pad(s)
    }
}

// ─── Queue Discipline ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Qdisc {
    FqCodel,
    Cake,
}

impl fmt::Display for Qdisc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::FqCodel => "fq_codel",
            Self::Cake => "cake",
        })
    }
}

// ─── NodeSpec ────────────────────────────────────────────────────────────────

/// Static identity of a simulated node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub name: String,
    pub interface: String,
    pub qdisc: Qdisc,
}

impl NodeSpec {
    pub fn new(id: &str, name: &str, interface: &str, qdisc: Qdisc) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            interface: interface.to_string(),
            qdisc,
        }
    }
}

// ─── NodeMetrics ─────────────────────────────────────────────────────────────

/// One node's identity plus its live telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    pub id: String,
    pub name: String,
    pub interface: String,
    pub qdisc: Qdisc,
    pub latency_ms: f64,
    /// Packets
    pub queue_depth: f64,
    pub packet_loss: f64,
    pub bandwidth_usage: f64,
    pub last_operator: Operator,
    pub status: NetworkStatus,
    pub timestamp: DateTime<Utc>,

    pub active_flows: u32,
    /// Φ
    pub syntropic_potential: f64,
    pub adoption_risk: f64,
    pub stochastic_forcing: bool,
}

// ─── LogEntry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub operator: Operator,
    pub message: String,
    pub automated: bool,
}

// ─── GridSummary ─────────────────────────────────────────────────────────────

/// Aggregate gauges over the current snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub node_count: usize,
    pub avg_potential: f64,
    pub avg_flows: u32,
    pub avg_risk: f64,
    pub optimal: usize,
    pub congested: usize,
    pub critical: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parses_codes_case_insensitively() {
        assert_eq!("r".parse::<Operator>().unwrap(), Operator::R);
        assert_eq!(" O ".parse::<Operator>().unwrap(), Operator::O);
        assert!("X".parse::<Operator>().is_err());
        assert!("".parse::<Operator>().is_err());
    }

    #[test]
    fn only_r_c_o_are_manually_injectable() {
        let manual: Vec<Operator> = Operator::ALL.iter()
            .copied()
            .filter(Operator::manually_injectable)
            .collect();
        assert_eq!(manual, vec![Operator::C, Operator::R, Operator::O]);
    }

    #[test]
    fn wire_names_match_dashboard() {
        assert_eq!(serde_json::to_string(&NetworkStatus::Congested).unwrap(), "\"CONGESTED\"");
        assert_eq!(serde_json::to_string(&Qdisc::FqCodel).unwrap(), "\"fq_codel\"");
        assert_eq!(serde_json::to_string(&Operator::H).unwrap(), "\"H\"");
    }
}
