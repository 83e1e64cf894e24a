//! Session configuration, loaded from YAML.
//!
//! ```yaml
//! tick_period: 1s
//! traffic_load: 30
//! log_capacity: 500
//! seed: 42
//! advisory:
//!   api_key_env: API_KEY
//!   model: gemini-3-flash-preview
//! nodes:
//!   - { id: n-01, name: Alpha-Gateway, interface: eth0, qdisc: cake }
//! ```
//!
//! Every field is optional; omitted fields take the defaults below.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::DEFAULT_TICK_PERIOD;
use crate::metrics::default_roster;
use crate::types::NodeSpec;

pub const DEFAULT_TRAFFIC_LOAD: f64 = 30.0;
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("traffic_load must be within 0..=100, got {0}")]
    TrafficLoadOutOfRange(f64),
    #[error("tick_period must be greater than zero")]
    ZeroTickPeriod,
    #[error("log_capacity must be greater than zero")]
    ZeroLogCapacity,
    #[error("node roster is empty")]
    EmptyRoster,
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    #[serde(with = "humantime_serde")]
    pub tick_period: Duration,
    pub traffic_load: f64,
    /// Ring-buffer bound for the operator log; unbounded when absent.
    pub log_capacity: Option<usize>,
    /// Seeds the generator and log ids for reproducible runs.
    pub seed: Option<u64>,
    pub advisory: AdvisoryConfig,
    pub nodes: Vec<NodeSpec>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            traffic_load: DEFAULT_TRAFFIC_LOAD,
            log_capacity: None,
            seed: None,
            advisory: AdvisoryConfig::default(),
            nodes: default_roster(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Environment variable holding the API key. The key is never stored here.
    pub api_key_env: String,
    pub model: String,
    pub endpoint: String,
    pub thinking_budget: u32,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
        }
    }
}

impl GridConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.traffic_load) {
            return Err(ConfigError::TrafficLoadOutOfRange(self.traffic_load));
        }
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.log_capacity == Some(0) {
            return Err(ConfigError::ZeroLogCapacity);
        }
        if self.nodes.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ConfigError::DuplicateNodeId(node.id.clone()));
            }
        }
        Ok(())
    }
}
