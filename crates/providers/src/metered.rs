//! Metering wrapper: one attempt, a hard deadline, and counters.
//!
//! Wraps any [`InferenceClient`]. The deadline is enforced with
//! `tokio::time::timeout`, so a request that is dropped or times out also
//! drops the in-flight HTTP call. There are no retries.

use async_trait::async_trait;
use folio_core::error::InferenceError;
use folio_core::inference::{InferenceClient, InferenceRequest, InferenceResponse};
use folio_telemetry::InferenceMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct MeteredClient {
    inner: Arc<dyn InferenceClient>,
    timeout: Duration,
    metrics: Arc<InferenceMetrics>,
}

impl MeteredClient {
    pub fn new(
        inner: Arc<dyn InferenceClient>,
        timeout: Duration,
        metrics: Arc<InferenceMetrics>,
    ) -> Self {
        Self {
            inner,
            timeout,
            metrics,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl InferenceClient for MeteredClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceResponse, InferenceError> {
        self.metrics.record_inference_request();
        let started = Instant::now();

        let result = match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        };
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                debug!(
                    provider = %self.inner.name(),
                    latency_ms = elapsed.as_millis() as u64,
                    "Inference succeeded"
                );
                self.metrics
                    .record_inference_success(elapsed, response.text.chars().count());
            }
            Err(e) => {
                warn!(
                    provider = %self.inner.name(),
                    error = %e,
                    kind = e.kind(),
                    latency_ms = elapsed.as_millis() as u64,
                    "Inference failed"
                );
                self.metrics
                    .record_inference_error(elapsed, matches!(e, InferenceError::Timeout { .. }));
            }
        }

        result
    }

    async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
        self.inner.health_check().await
    }
}
