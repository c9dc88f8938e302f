//! InferenceClient trait: the abstraction over the model backend.
//!
//! A client sends one fully assembled prompt and gets generated text back.
//! There is no conversation state and no streaming; the chat core asks one
//! question per request.
//!
//! Implementations: Ollama (`/api/generate`), OpenAI-compatible servers, and
//! the metering wrapper that adds the timeout and counters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::InferenceError;

/// Sampling options forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: None,
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// The model to use (e.g., "bruno-sre", "llama3.1:8b")
    pub model: String,

    /// The complete prompt, context included
    pub prompt: String,

    #[serde(default)]
    pub options: GenerationOptions,
}

/// Generated text plus bookkeeping.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Wall-clock time spent waiting on the backend.
    pub latency: Duration,
}

/// The core InferenceClient trait.
///
/// `generate` makes exactly one attempt. On failure the orchestrator serves a
/// canned answer rather than retrying.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Provider name (e.g., "ollama", "openai").
    fn name(&self) -> &str;

    /// The model id requests are sent with.
    fn model(&self) -> &str;

    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceResponse, InferenceError>;

    /// Liveness probe. `Ok(false)` means reachable but not serving.
    async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
        Ok(true)
    }
}
