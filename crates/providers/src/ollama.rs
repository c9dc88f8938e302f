//! Ollama client: single-shot `/api/generate` with streaming disabled.
//!
//! Request shape:
//! ```json
//! {"model": "bruno-sre", "prompt": "...", "stream": false,
//!  "options": {"temperature": 0.7, "top_p": 0.9, "num_predict": 1000}}
//! ```
//! The generated text comes back in the `response` field. Health is a cheap
//! `GET /api/tags`.

use async_trait::async_trait;
use folio_core::error::InferenceError;
use folio_core::inference::{InferenceClient, InferenceRequest, InferenceResponse};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// An Ollama inference endpoint.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        // No overall timeout here; the metering wrapper owns the deadline.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    /// Local default: `http://localhost:11434`.
    pub fn local(model: impl Into<String>) -> Self {
        Self::new("http://localhost:11434", model)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(request: &InferenceRequest) -> serde_json::Value {
        let mut options = serde_json::json!({
            "temperature": request.options.temperature,
            "top_p": request.options.top_p,
        });
        if let Some(max_tokens) = request.options.max_tokens {
            options["num_predict"] = serde_json::json!(max_tokens);
        }

        serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": options,
        })
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceResponse, InferenceError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = Self::request_body(&request);

        debug!(model = %request.model, prompt_chars = request.prompt.chars().count(), "Sending generate request");
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(InferenceError::BadResponse {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| InferenceError::BadResponse {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        if parsed.response.trim().is_empty() {
            return Err(InferenceError::BadResponse {
                status_code: status,
                message: "Empty response text".into(),
            });
        }

        Ok(InferenceResponse {
            text: parsed.response,
            model: parsed.model.unwrap_or(request.model),
            latency: started.elapsed(),
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        Ok(response.status().is_success())
    }
}
