//! End-to-end tests for the Folio chat backend.
//!
//! These exercise the whole pipeline from an HTTP request or `ChatQuery`
//! to the response: classification, SQLite retrieval, prompt assembly,
//! inference through the metering layer, health gating, and fallback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use folio_agent::{ChatOrchestrator, HealthMonitor, HealthStatus, PromptAssembler};
use folio_config::{AppConfig, GatewayConfig, HealthConfig};
use folio_core::{
    Category, ChatQuery, DataStore, InferenceClient, InferenceError, InferenceRequest, InferenceResponse,
};
use folio_gateway::{GatewayState, build_router};
use folio_providers::MeteredClient;
use folio_store::{InMemoryStore, SqliteStore, demo_profile};
use folio_telemetry::InferenceMetrics;

// ── Mock Client ──────────────────────────────────────────────────────────

/// Answers after a fixed delay, or fails while switched off. Records every
/// prompt it receives.
struct ScriptedClient {
    up: AtomicBool,
    latency: Duration,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self {
            up: AtomicBool::new(true),
            latency: Duration::ZERO,
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl InferenceClient for ScriptedClient {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    fn model(&self) -> &str {
        "bruno-sre"
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        self.prompts.lock().unwrap().push(request.prompt);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.up.load(Ordering::SeqCst) {
            return Err(InferenceError::Unavailable("connection refused".into()));
        }
        Ok(InferenceResponse {
            text: "Bruno has run Kubernetes in production since 2021.".into(),
            model: request.model,
            latency: self.latency,
        })
    }

    async fn health_check(&self) -> Result<bool, InferenceError> {
        if self.up.load(Ordering::SeqCst) {
            Ok(true)
        } else {
            Err(InferenceError::Unavailable("connection refused".into()))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

struct Harness {
    client: Arc<ScriptedClient>,
    metrics: Arc<InferenceMetrics>,
    orchestrator: Arc<ChatOrchestrator>,
}

async fn seeded_store() -> Arc<SqliteStore> {
    let store = SqliteStore::new("sqlite::memory:").await.unwrap();
    store.seed(&demo_profile()).await.unwrap();
    Arc::new(store)
}

async fn harness_with(client: ScriptedClient, health: HealthConfig, max_chars: usize) -> Harness {
    harness_on(seeded_store().await, client, health, max_chars)
}

fn harness_on(
    store: Arc<dyn DataStore>,
    client: ScriptedClient,
    health: HealthConfig,
    max_chars: usize,
) -> Harness {
    let client = Arc::new(client);
    let metrics = Arc::new(InferenceMetrics::new());
    let metered: Arc<dyn InferenceClient> = Arc::new(MeteredClient::new(
        client.clone(),
        Duration::from_secs(30),
        metrics.clone(),
    ));
    let monitor = Arc::new(HealthMonitor::new(metered.clone(), health));

    let mut config = AppConfig::default();
    config.prompt.max_chars = max_chars;
    let orchestrator = Arc::new(ChatOrchestrator::from_config(
        &config,
        store,
        metered,
        monitor,
        metrics.clone(),
    ));

    Harness {
        client,
        metrics,
        orchestrator,
    }
}

async fn harness() -> Harness {
    harness_with(ScriptedClient::new(), HealthConfig::default(), 12_000).await
}

async fn post_chat(router: axum::Router, message: &str) -> serde_json::Value {
    let body = serde_json::json!({ "message": message }).to_string();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Properties ───────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_skills_question_uses_skills_context() {
    let h = harness().await;
    let resp = h
        .orchestrator
        .chat(ChatQuery::new("What skills does Bruno have?"))
        .await;

    assert!(resp.sources.contains(&"skills".to_string()));
    let prompt = h.client.last_prompt();
    assert!(prompt.contains("### Skills"));
    assert!(prompt.contains("- Kubernetes (Infrastructure), proficiency 5/5"));
    assert!(!prompt.contains("Jenkins"));
}

#[tokio::test]
async fn e2e_empty_question_answers_about() {
    let h = harness().await;
    let resp = h.orchestrator.chat(ChatQuery::new("")).await;

    assert_eq!(resp.sources, vec!["about"]);
    assert!(!resp.response.trim().is_empty());
    assert!(h.client.last_prompt().contains("Site Reliability Engineer"));
}

#[tokio::test]
async fn e2e_forced_failure_serves_canned_answer() {
    let client = ScriptedClient::new();
    client.set_up(false);
    let h = harness_with(client, HealthConfig::default(), 12_000).await;

    let resp = h
        .orchestrator
        .chat(ChatQuery::new("Which projects has he built?"))
        .await;

    assert_eq!(resp.model, "fallback");
    assert_eq!(resp.sources, vec!["projects"]);
    assert!(!resp.response.is_empty());
    assert_eq!(h.client.calls(), 1);

    let snap = h.metrics.snapshot();
    assert_eq!(snap.inference_requests, 1);
    assert_eq!(snap.inference_errors, 1);
    assert_eq!(snap.fallbacks, 1);
}

#[tokio::test]
async fn e2e_degraded_backend_is_not_called_until_healthy() {
    let health = HealthConfig {
        failure_threshold: 2,
        ..HealthConfig::default()
    };
    let client = ScriptedClient::new();
    client.set_up(false);
    let h = harness_with(client, health, 12_000).await;
    let monitor = h.orchestrator.monitor().clone();

    assert!(!monitor.probe().await);
    assert_eq!(monitor.status(), HealthStatus::Unknown);
    assert!(!monitor.probe().await);
    assert_eq!(monitor.status(), HealthStatus::Degraded);

    for _ in 0..3 {
        let resp = h
            .orchestrator
            .chat(ChatQuery::new("What is his experience?"))
            .await;
        assert!(resp.is_fallback());
        assert_eq!(resp.sources, vec!["experience"]);
    }
    assert_eq!(h.client.calls(), 0);

    h.client.set_up(true);
    assert!(monitor.probe().await);
    assert_eq!(monitor.status(), HealthStatus::Healthy);

    let resp = h
        .orchestrator
        .chat(ChatQuery::new("What is his experience?"))
        .await;
    assert!(!resp.is_fallback());
    assert_eq!(h.client.calls(), 1);
}

#[tokio::test]
async fn e2e_over_budget_prompt_keeps_about_and_drops_contact() {
    let h = harness_with(ScriptedClient::new(), HealthConfig::default(), 700).await;
    let orchestrator = ChatOrchestrator::from_config(
        &AppConfig::default(),
        seeded_store().await,
        h.client.clone(),
        h.orchestrator.monitor().clone(),
        h.metrics.clone(),
    )
    .with_assembler(PromptAssembler::new("Answer briefly.", 700));

    let question = "Tell me about his experience, skills, projects and how to contact him";
    let (categories, assembled) = orchestrator.build_prompt(question).await;
    assert_eq!(categories.len(), 5);

    assert!(assembled.prompt.chars().count() <= 700);
    assert!(assembled.included.contains(&Category::About));
    assert!(!assembled.included.contains(&Category::Contact));
    assert!(
        assembled
            .metadata
            .drops
            .iter()
            .any(|d| d.category == Category::Contact)
    );
    assert!(assembled.prompt.ends_with(&format!("User: {question}\nAssistant:")));

    let resp = orchestrator.chat(ChatQuery::new(question)).await;
    assert!(!resp.sources.contains(&"contact".to_string()));
    assert!(resp.sources.contains(&"about".to_string()));
}

#[tokio::test]
async fn e2e_kubernetes_question_over_http() {
    let h = harness().await;
    let router = build_router(
        Arc::new(GatewayState::new(h.orchestrator.clone())),
        &GatewayConfig::default(),
    );

    let json = post_chat(router, "What is Bruno's experience with Kubernetes?").await;

    assert_eq!(json["sources"], serde_json::json!(["experience", "skills"]));
    assert_eq!(json["model"], "bruno-sre");
    assert!(json["response"].as_str().unwrap().contains("Kubernetes"));

    let prompt = h.client.last_prompt();
    assert!(prompt.contains("Senior Site Reliability Engineer at Northwind Cloud"));
    assert!(prompt.contains("- Kubernetes (Infrastructure), proficiency 5/5"));
    assert!(prompt.find("### Experience").unwrap() < prompt.find("### Skills").unwrap());
}

#[tokio::test(start_paused = true)]
async fn e2e_concurrent_requests_run_in_parallel() {
    let latency = Duration::from_millis(500);
    let h = harness_on(
        Arc::new(InMemoryStore::demo()),
        ScriptedClient::new().with_latency(latency),
        HealthConfig::default(),
        12_000,
    );

    let started = tokio::time::Instant::now();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let orchestrator = h.orchestrator.clone();
        tasks.spawn(async move {
            orchestrator
                .chat(ChatQuery::new(format!("What skills does Bruno have? #{i}")))
                .await
        });
    }

    let mut answered = 0;
    while let Some(result) = tasks.join_next().await {
        assert!(!result.unwrap().is_fallback());
        answered += 1;
    }

    assert_eq!(answered, 8);
    assert_eq!(h.client.calls(), 8);
    // Serialized calls would take 8 × latency
    assert!(started.elapsed() < latency * 2);
    assert_eq!(h.metrics.snapshot().latency.samples, 8);
}

// ── Wiring ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_config_file_wires_sqlite_and_unreachable_backend() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("profile.db");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
profile_name = "Bruno"

[inference]
provider = "ollama"
base_url = "http://127.0.0.1:1"
model = "bruno-sre"
timeout_secs = 5

[store]
backend = "sqlite"
path = '{}'
"#,
            db_path.display()
        ),
    )
    .unwrap();

    let config = AppConfig::load_from(&config_path).unwrap();
    let state = Arc::new(GatewayState::from_config(&config).await.unwrap());
    assert!(db_path.exists());

    let router = build_router(state.clone(), &config.gateway);
    let json = post_chat(router.clone(), "What skills does he have?").await;
    assert_eq!(json["model"], "fallback");
    assert_eq!(json["sources"], serde_json::json!(["skills"]));

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let metrics: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(metrics["chat_requests"], 1);
    assert_eq!(metrics["inference_errors"], 1);
    assert_eq!(metrics["fallbacks"], 1);
}

#[tokio::test]
async fn e2e_health_endpoint_tracks_monitor() {
    let client = ScriptedClient::new();
    client.set_up(false);
    let h = harness_with(
        client,
        HealthConfig {
            failure_threshold: 1,
            ..HealthConfig::default()
        },
        12_000,
    )
    .await;
    let state = Arc::new(GatewayState::new(h.orchestrator.clone()));
    state.monitor.probe().await;

    let response = build_router(state, &GatewayConfig::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["provider"], "e2e_mock");
    assert_eq!(json["model"], "bruno-sre");
}

#[tokio::test]
async fn e2e_profile_json_seeds_sqlite() {
    let mut profile = demo_profile();
    profile.skills.retain(|s| s.name == "Rust");
    let json = serde_json::to_string(&profile).unwrap();
    let parsed: folio_store::ProfileData = serde_json::from_str(&json).unwrap();

    let store = SqliteStore::new("sqlite::memory:").await.unwrap();
    store.seed(&demo_profile()).await.unwrap();
    // Seeding replaces everything
    store.seed(&parsed).await.unwrap();

    let skills = store.skills(20).await.unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0].name, "Rust");
    assert_eq!(store.experiences().await.unwrap().len(), 3);
}
