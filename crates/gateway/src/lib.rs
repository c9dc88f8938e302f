//! HTTP API gateway for Folio.
//!
//! Exposes the chat pipeline to the portfolio site:
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /chat` | `{message}` → `{response, sources, model, timestamp}` |
//! | `GET /health` | Model backend status as seen by the health monitor |
//! | `GET /metrics` | Inference counters and latency |
//!
//! Built on Axum; CORS origins come from `[gateway] cors_origins`.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use folio_agent::{ChatOrchestrator, HealthMonitor, HealthSnapshot};
use folio_config::{AppConfig, GatewayConfig};
use folio_core::{ChatQuery, ChatResponse};
use folio_telemetry::{InferenceMetrics, MetricsSnapshot};

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub monitor: Arc<HealthMonitor>,
    pub metrics: Arc<InferenceMetrics>,
}

type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Wire store, model client, health monitor, and orchestrator from config.
    ///
    /// The monitor is not started; call [`HealthMonitor::spawn`] on
    /// `state.monitor` (or use [`start`]).
    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = folio_store::open(&config.store).await?;
        let metrics = Arc::new(InferenceMetrics::new());
        let client = folio_providers::build_from_config(config, metrics.clone())?;
        let monitor = Arc::new(HealthMonitor::new(client.clone(), config.health.clone()));

        let orchestrator = Arc::new(ChatOrchestrator::from_config(
            config,
            store,
            client,
            monitor.clone(),
            metrics.clone(),
        ));

        Ok(Self {
            orchestrator,
            monitor,
            metrics,
        })
    }

    /// State around an already-built orchestrator, sharing its monitor and
    /// metrics.
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self {
            monitor: orchestrator.monitor().clone(),
            metrics: orchestrator.metrics().clone(),
            orchestrator,
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&config.cors_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the configured origins. `"*"` allows any origin; unparseable
/// entries are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.trim().parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server and the health monitor.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(GatewayState::from_config(&config).await?);
    let probe = state.monitor.spawn();
    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        provider = %config.inference.provider,
        model = %config.inference.model,
        store = %config.store.backend,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    probe.abort();
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

async fn chat_handler(
    State(state): State<SharedState>,
    Json(query): Json<ChatQuery>,
) -> Json<ChatResponse> {
    info!(message_len = query.message.len(), "Chat request received");
    Json(state.orchestrator.chat(query).await)
}

#[derive(Serialize)]
struct HealthResponse {
    #[serde(flatten)]
    snapshot: HealthSnapshot,
    timestamp: DateTime<Utc>,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        snapshot: state.monitor.snapshot(),
        timestamp: Utc::now(),
    })
}

async fn metrics_handler(State(state): State<SharedState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
