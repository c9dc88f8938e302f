//! The chat pipeline: classify → retrieve → assemble → infer or fall back.

use crate::classifier::classify;
use crate::context::{AssembledPrompt, PromptAssembler};
use crate::fallback::FallbackResponder;
use crate::health::HealthMonitor;
use crate::retriever::ContextRetriever;
use chrono::Utc;
use folio_config::{AppConfig, RetrievalConfig};
use folio_core::inference::{GenerationOptions, InferenceClient, InferenceRequest};
use folio_core::{Category, ChatQuery, ChatResponse, DataStore, FALLBACK_MODEL};
use folio_telemetry::InferenceMetrics;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Answers one question at a time; share it behind an `Arc` for concurrent
/// requests. Holds no lock across the model call.
pub struct ChatOrchestrator {
    retriever: ContextRetriever,
    assembler: PromptAssembler,
    client: Arc<dyn InferenceClient>,
    monitor: Arc<HealthMonitor>,
    fallback: FallbackResponder,
    metrics: Arc<InferenceMetrics>,
    options: GenerationOptions,
}

impl ChatOrchestrator {
    /// Create an orchestrator with default retrieval caps, prompt budget, and
    /// built-in fallback answers.
    pub fn new(
        store: Arc<dyn DataStore>,
        client: Arc<dyn InferenceClient>,
        monitor: Arc<HealthMonitor>,
    ) -> Self {
        let defaults = AppConfig::default();
        Self {
            retriever: ContextRetriever::new(store, RetrievalConfig::default()),
            assembler: PromptAssembler::new(
                PromptAssembler::default_persona(&defaults.profile_name),
                defaults.prompt.max_chars,
            ),
            client,
            monitor,
            fallback: FallbackResponder::new(&defaults.profile_name),
            metrics: Arc::new(InferenceMetrics::new()),
            options: GenerationOptions::default(),
        }
    }

    /// Everything from configuration. `metrics` should be the instance the
    /// client's metering layer records into.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn DataStore>,
        client: Arc<dyn InferenceClient>,
        monitor: Arc<HealthMonitor>,
        metrics: Arc<InferenceMetrics>,
    ) -> Self {
        let persona = config
            .prompt
            .persona
            .clone()
            .unwrap_or_else(|| PromptAssembler::default_persona(&config.profile_name));

        Self::new(store.clone(), client, monitor)
            .with_retrieval(store, config.retrieval.clone())
            .with_assembler(PromptAssembler::new(persona, config.prompt.max_chars))
            .with_fallback(
                FallbackResponder::new(&config.profile_name)
                    .with_overrides(&config.fallback.responses),
            )
            .with_metrics(metrics)
            .with_options(config.inference.generation_options())
    }

    pub fn with_retrieval(mut self, store: Arc<dyn DataStore>, limits: RetrievalConfig) -> Self {
        self.retriever = ContextRetriever::new(store, limits);
        self
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackResponder) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<InferenceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    pub fn metrics(&self) -> &Arc<InferenceMetrics> {
        &self.metrics
    }

    pub fn client(&self) -> &Arc<dyn InferenceClient> {
        &self.client
    }

    /// Classify, retrieve, and assemble without calling the model.
    pub async fn build_prompt(&self, question: &str) -> (BTreeSet<Category>, AssembledPrompt) {
        let categories = classify(question);
        let blocks = self.retriever.retrieve(&categories).await;
        let assembled = self.assembler.assemble(question, &blocks);
        (categories, assembled)
    }

    /// Answer a question. Never fails: any problem below this point ends in
    /// a canned answer.
    pub async fn chat(&self, query: ChatQuery) -> ChatResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("chat", %request_id);
        self.answer(query).instrument(span).await
    }

    async fn answer(&self, query: ChatQuery) -> ChatResponse {
        self.metrics.record_chat_request();
        let started = Instant::now();

        let status = self.monitor.status();
        if !status.allows_inference() {
            let categories = classify(&query.message);
            debug!(?categories, "Backend degraded, skipping model call");
            return self.fallback_response(&categories);
        }

        let (categories, assembled) = self.build_prompt(&query.message).await;
        debug!(
            ?categories,
            included = ?assembled.included,
            prompt_chars = assembled.metadata.total_chars,
            estimated_tokens = assembled.metadata.estimated_tokens,
            dropped = assembled.metadata.drops.len(),
            "Prompt assembled"
        );

        let request = InferenceRequest {
            model: self.client.model().to_string(),
            prompt: assembled.prompt,
            options: self.options.clone(),
        };

        match self.client.generate(request).await {
            Ok(response) if !response.text.trim().is_empty() => {
                let model = if response.model.is_empty() {
                    self.client.model().to_string()
                } else {
                    response.model
                };
                info!(
                    %model,
                    sources = ?assembled.included,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Chat answered by model"
                );
                ChatResponse {
                    response: response.text,
                    sources: assembled.included.iter().map(|c| c.as_str().to_string()).collect(),
                    model,
                    timestamp: Utc::now(),
                }
            }
            Ok(_) => {
                warn!("Model returned empty text, using fallback");
                self.fallback_response(&categories)
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Inference failed, using fallback");
                self.fallback_response(&categories)
            }
        }
    }

    fn fallback_response(&self, categories: &BTreeSet<Category>) -> ChatResponse {
        self.metrics.record_fallback();
        let fallback = self.fallback.respond(categories);
        info!(category = %fallback.category, "Chat answered by fallback");
        ChatResponse {
            response: fallback.text.to_string(),
            sources: vec![fallback.category.as_str().to_string()],
            model: FALLBACK_MODEL.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_config::HealthConfig;
    use folio_core::{InferenceError, InferenceResponse};
    use folio_store::InMemoryStore;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records prompts; answers or fails on demand.
    struct MockClient {
        fail: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl InferenceClient for MockClient {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "bruno-sre"
        }

        async fn generate(
            &self,
            request: InferenceRequest,
        ) -> std::result::Result<InferenceResponse, InferenceError> {
            self.prompts.lock().unwrap().push(request.prompt);
            if self.fail {
                return Err(InferenceError::Timeout { timeout_secs: 30 });
            }
            Ok(InferenceResponse {
                text: "Bruno has run Kubernetes in production since 2021.".into(),
                model: request.model,
                latency: Duration::from_millis(5),
            })
        }
    }

    fn orchestrator(client: Arc<MockClient>) -> ChatOrchestrator {
        let monitor = Arc::new(HealthMonitor::new(client.clone(), HealthConfig::default()));
        ChatOrchestrator::new(Arc::new(InMemoryStore::demo()), client, monitor)
    }

    #[tokio::test]
    async fn model_answer_reports_included_sources() {
        let client = Arc::new(MockClient::new(false));
        let orch = orchestrator(client.clone());

        let resp = orch
            .chat(ChatQuery::new("What is Bruno's experience with Kubernetes?"))
            .await;
        assert_eq!(resp.sources, vec!["experience", "skills"]);
        assert_eq!(resp.model, "bruno-sre");
        assert!(!resp.is_fallback());
        assert_eq!(client.calls(), 1);

        let prompt = client.last_prompt();
        assert!(prompt.contains("### Experience"));
        assert!(prompt.contains("### Skills"));
        assert!(prompt.ends_with("User: What is Bruno's experience with Kubernetes?\nAssistant:"));
    }

    #[tokio::test]
    async fn failure_falls_back() {
        let client = Arc::new(MockClient::new(true));
        let orch = orchestrator(client.clone());

        let resp = orch.chat(ChatQuery::new("What skills does he have?")).await;
        assert!(resp.is_fallback());
        assert_eq!(resp.sources, vec!["skills"]);
        assert!(!resp.response.is_empty());
        assert_eq!(orch.metrics().fallbacks(), 1);
    }

    #[tokio::test]
    async fn degraded_skips_the_model() {
        let client = Arc::new(MockClient::new(false));
        let orch = orchestrator(client.clone());
        for _ in 0..HealthConfig::default().failure_threshold {
            orch.monitor().record_failure("down");
        }

        let resp = orch.chat(ChatQuery::new("Tell me about his projects")).await;
        assert!(resp.is_fallback());
        assert_eq!(resp.sources, vec!["about"]);
        assert_eq!(client.calls(), 0);

        orch.monitor().record_success();
        let resp = orch.chat(ChatQuery::new("Tell me about his projects")).await;
        assert!(!resp.is_fallback());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn empty_question_gets_about_answer() {
        let client = Arc::new(MockClient::new(false));
        let orch = orchestrator(client.clone());
        let resp = orch.chat(ChatQuery::new("")).await;
        assert_eq!(resp.sources, vec!["about"]);
        assert!(!resp.response.is_empty());
    }

    #[tokio::test]
    async fn build_prompt_does_not_call_model() {
        let client = Arc::new(MockClient::new(false));
        let orch = orchestrator(client.clone());
        let (categories, assembled) = orch.build_prompt("How can I contact him?").await;
        assert!(categories.contains(&Category::Contact));
        assert!(assembled.prompt.contains("Email: bruno@example.com"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn from_config_applies_overrides() {
        let mut config = AppConfig::default();
        config.profile_name = "Ana".into();
        config.inference.max_tokens = 0;
        config.prompt.persona = Some("Custom persona.".into());
        config
            .fallback
            .responses
            .insert("skills".into(), "Ana knows Rust.".into());

        let client = Arc::new(MockClient::new(true));
        let monitor = Arc::new(HealthMonitor::new(client.clone(), config.health.clone()));
        let metrics = Arc::new(InferenceMetrics::new());
        let orch = ChatOrchestrator::from_config(
            &config,
            Arc::new(InMemoryStore::demo()),
            client.clone(),
            monitor,
            metrics.clone(),
        );

        assert!(orch.options.max_tokens.is_none());

        let resp = orch.chat(ChatQuery::new("skills?")).await;
        assert_eq!(resp.response, "Ana knows Rust.");
        assert!(client.last_prompt().starts_with("Custom persona."));
        assert_eq!(metrics.snapshot().chat_requests, 1);
        assert_eq!(metrics.fallbacks(), 1);
    }
}
