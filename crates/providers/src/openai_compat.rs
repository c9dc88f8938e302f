//! OpenAI-compatible client.
//!
//! Works with vLLM, llama.cpp server, LM Studio, Ollama's `/v1` shim, and
//! hosted OpenAI-style endpoints. The assembled prompt is sent as a single
//! user message; there is no conversation state.

use async_trait::async_trait;
use folio_core::error::InferenceError;
use folio_core::inference::{InferenceClient, InferenceRequest, InferenceResponse};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// An OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatClient {
    /// `base_url` may be given with or without the trailing `/v1`.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/');
        let base_url = base_url.strip_suffix("/v1").unwrap_or(base_url).to_string();

        Self {
            name: name.into(),
            base_url,
            model: model.into(),
            api_key: None,
            client,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request. Blank keys are ignored.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn request_body(request: &InferenceRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.options.temperature,
            "top_p": request.options.top_p,
            "stream": false,
        });
        if let Some(max_tokens) = request.options.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl InferenceClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceResponse, InferenceError> {
        let body = Self::request_body(&request);
        debug!(provider = %self.name, model = %request.model, "Sending completion request");
        let started = Instant::now();

        let response = self
            .authorize(self.client.post(self.endpoint("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(InferenceError::BadResponse {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| InferenceError::BadResponse {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| InferenceError::BadResponse {
                status_code: status,
                message: "No content in response".into(),
            })?;

        Ok(InferenceResponse {
            text,
            model: api_response.model.unwrap_or(request.model),
            latency: started.elapsed(),
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
        let response = self
            .authorize(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        Ok(response.status().is_success())
    }
}
