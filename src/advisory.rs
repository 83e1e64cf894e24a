// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Advisory Client

//! Natural-language grid analysis from a hosted text-generation model.
//!
//! The boundary is deliberately lossy: [`Advisor::analyze`] always yields a
//! displayable string. Transport, auth and quota failures are logged and
//! replaced by [`FAILURE_MESSAGE`]; an empty reply becomes
//! [`NO_TEXT_MESSAGE`]. There is no retry, timeout or cache.

use std::future::Future;

use serde::Deserialize;

use crate::types::{NodeMetrics, Operator};

pub const IDLE_MESSAGE: &str = "Grid Operational. Awaiting analysis of stochastic potential...";
pub const ANALYZING_MESSAGE: &str = "Syntropic Intelligence is analyzing Grid Potential (Φ)...";
pub const NO_TEXT_MESSAGE: &str = "Analysis complete, but no text returned.";
pub const FAILURE_MESSAGE: &str = "Failed to contact Syntropic Intelligence Core (Gemini API Error).";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
    #[error("failed to serialize node snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Embed the full snapshot as pretty JSON in the analysis prompt.
pub fn build_prompt(nodes: &[NodeMetrics]) -> Result<String, serde_json::Error> {
    let state = serde_json::to_string_pretty(nodes)?;
    let operators = Operator::ALL.iter()
        .map(|op| format!("{} ({})", op.code(), op.description()))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "You are a syntropic network engineer reviewing Linux kernel traffic-control \
(tc qdisc) telemetry.\n\n\
Current state:\n{state}\n\n\
Available operators: {operators}.\n\n\
Rules:\n\
- Latency above 50ms calls for C.\n\
- Queue depth above 1000 calls for R.\n\
- Packet loss above 1% calls for O.\n\n\
Reply with a two-sentence tactical analysis and the next manual intervention to apply."
    ))
}

// ---------------------------------------------------------------------------
// Generator seam
// ---------------------------------------------------------------------------

/// A hosted text-generation backend.
///
/// `Ok(None)` means the service answered without any text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<Option<String>, AdvisoryError>>;
}

pub struct Advisor<G> {
    generator: G,
}

impl<G: TextGenerator> Advisor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Never fails; see module docs for the fallback strings.
    pub async fn analyze(&self, nodes: &[NodeMetrics]) -> String {
        match self.try_analyze(nodes).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => NO_TEXT_MESSAGE.to_string(),
            Err(err) => {
                tracing::error!(%err, "advisory analysis failed");
                FAILURE_MESSAGE.to_string()
            }
        }
    }

    async fn try_analyze(&self, nodes: &[NodeMetrics]) -> Result<Option<String>, AdvisoryError> {
        let prompt = build_prompt(nodes)?;
        tracing::info!(nodes = nodes.len(), bytes = prompt.len(), "requesting grid analysis");
        self.generator.generate(&prompt).await
    }
}

// ---------------------------------------------------------------------------
// Gemini response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

/// Concatenate the answer parts of the first candidate, skipping thoughts.
pub fn extract_text(body: &serde_json::Value) -> Option<String> {
    let resp: GenerateResponse = serde_json::from_value(body.clone()).unwrap_or_default();
    let text: String = resp.candidates.into_iter()
        .next()?
        .content?
        .parts.into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

// ---------------------------------------------------------------------------
// Gemini HTTP client
// ---------------------------------------------------------------------------

#[cfg(not(target_arch = "wasm32"))]
pub use self::gemini::GeminiClient;

#[cfg(not(target_arch = "wasm32"))]
mod gemini {
    use super::*;
    use crate::config::AdvisoryConfig;

    pub struct GeminiClient {
        http: reqwest::Client,
        config: AdvisoryConfig,
        api_key: Option<String>,
    }

    impl GeminiClient {
        /// The key is looked up in `config.api_key_env` on every request.
        pub fn new(config: AdvisoryConfig) -> Self {
            Self { http: reqwest::Client::new(), config, api_key: None }
        }

        /// Pin the key instead of reading the environment.
        pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
            self.api_key = Some(key.into());
            self
        }

        pub fn config(&self) -> &AdvisoryConfig {
            &self.config
        }

        fn resolve_key(&self) -> Result<String, AdvisoryError> {
            if let Some(key) = &self.api_key {
                return Ok(key.clone());
            }
            std::env::var(&self.config.api_key_env)
                .ok()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| AdvisoryError::MissingApiKey(self.config.api_key_env.clone()))
        }

        pub fn url(&self) -> String {
            format!(
                "{}/models/{}:generateContent",
                self.config.endpoint.trim_end_matches('/'),
                self.config.model,
            )
        }

        pub fn request_body(&self, prompt: &str) -> serde_json::Value {
            serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "thinkingConfig": { "thinkingBudget": self.config.thinking_budget }
                }
            })
        }
    }

    impl TextGenerator for GeminiClient {
        async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError> {
            let key = self.resolve_key()?;
            let resp = self.http
                .post(self.url())
                .header("x-goog-api-key", key)
                .json(&self.request_body(prompt))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(AdvisoryError::Status { status: status.as_u16(), body });
            }
            let body: serde_json::Value = resp.json().await?;
            Ok(extract_text(&body))
        }
    }
}
