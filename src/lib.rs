// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite

pub mod types;
pub mod rounding;
pub mod sampler;
pub mod metrics;
pub mod log;
pub mod clock;
pub mod driver;
pub mod intervention;
pub mod advisory;
pub mod config;
pub mod session;

#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;

pub use types::*;
pub use config::GridConfig;
pub use driver::{RunState, SimulationDriver, Snapshot};
pub use session::GridSession;

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser handle. The dashboard calls `advance()` from its own
/// `setInterval`; the driver decides whether a tick is due.
#[wasm_bindgen]
pub struct GridSimulation {
    config: GridConfig,
    session: GridSession,
}

#[wasm_bindgen]
impl GridSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(traffic_load: f64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = GridConfig {
            traffic_load: metrics::clamp_load(traffic_load),
            ..GridConfig::default()
        };
        let session = GridSession::new(&config);
        Self { config, session }
    }

    /// Returns true when a tick fired.
    pub fn advance(&mut self) -> bool {
        self.session.advance().is_some()
    }

    /// Force a tick now and return the new nodes (null while paused).
    pub fn tick(&mut self) -> JsValue {
        match self.session.tick() {
            Some(snapshot) => serde_wasm_bindgen::to_value(&*snapshot).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Returns true when the simulation is running afterwards.
    pub fn toggle_running(&mut self) -> bool {
        self.session.toggle_running() == RunState::Running
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn set_traffic_load(&mut self, val: f64) { self.session.set_traffic_load(val); }
    pub fn traffic_load(&self) -> f64 { self.session.traffic_load() }

    /// `op` is a single operator code. Unknown codes are ignored and
    /// return false; unknown node ids are logged and return false.
    pub fn apply_operator(&mut self, node_id: &str, op: &str) -> bool {
        match op.parse::<Operator>() {
            Ok(operator) => self.session.apply_operator(node_id, operator),
            Err(_) => false,
        }
    }

    pub fn get_nodes(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.session.nodes()).unwrap_or(JsValue::NULL)
    }

    pub fn get_logs(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.session.logs().to_vec()).unwrap_or(JsValue::NULL)
    }

    pub fn get_summary(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.session.summary()).unwrap_or(JsValue::NULL)
    }

    /// Prompt for the current snapshot; the page performs the request.
    pub fn analysis_prompt(&self) -> String {
        advisory::build_prompt(self.session.nodes()).unwrap_or_default()
    }

    /// Marks a request in flight and returns its id.
    pub fn begin_analysis(&mut self) -> f64 {
        self.session.begin_analysis().id as f64
    }

    /// Pass `None` (undefined) for a failed request. Returns `false` for an
    /// id that is not in flight.
    pub fn complete_analysis(&mut self, request_id: f64, text: Option<String>) -> bool {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            Some(_) => advisory::NO_TEXT_MESSAGE.to_string(),
            None => advisory::FAILURE_MESSAGE.to_string(),
        };
        self.session.complete_analysis(request_id as u64, text)
    }

    pub fn analysis_text(&self) -> String {
        self.session.analysis_text().to_string()
    }

    pub fn is_analyzing(&self) -> bool {
        self.session.is_analyzing()
    }

    /// Reset node telemetry to the initial snapshot
    pub fn reset(&mut self) {
        self.session.reset_nodes(&self.config);
    }
}
