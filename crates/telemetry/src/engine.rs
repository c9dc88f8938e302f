//! Thread-safe counters for the inference path.

use crate::model::{LatencySummary, MetricsSnapshot};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters for chat and inference traffic.
///
/// Counters only ever increase; readers take a [`MetricsSnapshot`].
#[derive(Debug)]
pub struct InferenceMetrics {
    chat_requests: AtomicU64,
    inference_requests: AtomicU64,
    inference_errors: AtomicU64,
    inference_timeouts: AtomicU64,
    fallbacks: AtomicU64,
    response_chars: AtomicU64,
    latency_samples: AtomicU64,
    latency_total_ms: AtomicU64,
    latency_max_ms: AtomicU64,
    since: DateTime<Utc>,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self {
            chat_requests: AtomicU64::new(0),
            inference_requests: AtomicU64::new(0),
            inference_errors: AtomicU64::new(0),
            inference_timeouts: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            response_chars: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
            latency_total_ms: AtomicU64::new(0),
            latency_max_ms: AtomicU64::new(0),
            since: Utc::now(),
        }
    }

    // ── Recording ─────────────────────────────────────────────────────

    pub fn record_chat_request(&self) {
        self.chat_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an outgoing generation call. Call before awaiting the backend.
    pub fn record_inference_request(&self) {
        self.inference_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inference_success(&self, elapsed: Duration, response_chars: usize) {
        self.response_chars
            .fetch_add(response_chars as u64, Ordering::Relaxed);
        self.record_latency(elapsed);
    }

    pub fn record_inference_error(&self, elapsed: Duration, timed_out: bool) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
        if timed_out {
            self.inference_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        self.record_latency(elapsed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, elapsed: Duration) {
        let ms = elapsed.as_millis().min(u64::MAX as u128) as u64;
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
        self.latency_total_ms.fetch_add(ms, Ordering::Relaxed);
        self.latency_max_ms.fetch_max(ms, Ordering::Relaxed);
        tracing::trace!(latency_ms = ms, "Inference latency recorded");
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn inference_requests(&self) -> u64 {
        self.inference_requests.load(Ordering::Relaxed)
    }

    pub fn inference_errors(&self) -> u64 {
        self.inference_errors.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Get a point-in-time copy of every counter.
    ///
    /// Counters are read independently, so a snapshot taken under load may
    /// be off by the few calls in flight.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        let total_ms = self.latency_total_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            chat_requests: self.chat_requests.load(Ordering::Relaxed),
            inference_requests: self.inference_requests(),
            inference_errors: self.inference_errors(),
            inference_timeouts: self.inference_timeouts.load(Ordering::Relaxed),
            fallbacks: self.fallbacks(),
            response_chars: self.response_chars.load(Ordering::Relaxed),
            latency: LatencySummary {
                samples,
                avg_ms: if samples == 0 {
                    0.0
                } else {
                    total_ms as f64 / samples as f64
                },
                max_ms: self.latency_max_ms.load(Ordering::Relaxed),
            },
            since: self.since,
        }
    }
}

impl Default for InferenceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fresh_metrics_are_zero() {
        let snap = InferenceMetrics::new().snapshot();
        assert_eq!(snap.inference_requests, 0);
        assert_eq!(snap.latency, LatencySummary::default());
        assert_eq!(snap.error_rate(), 0.0);
    }

    #[test]
    fn success_and_error_accounting() {
        let m = InferenceMetrics::new();
        m.record_inference_request();
        m.record_inference_success(Duration::from_millis(100), 42);
        m.record_inference_request();
        m.record_inference_error(Duration::from_millis(300), true);
        m.record_fallback();

        let snap = m.snapshot();
        assert_eq!(snap.inference_requests, 2);
        assert_eq!(snap.inference_errors, 1);
        assert_eq!(snap.inference_timeouts, 1);
        assert_eq!(snap.fallbacks, 1);
        assert_eq!(snap.response_chars, 42);
        assert_eq!(snap.latency.samples, 2);
        assert_eq!(snap.latency.max_ms, 300);
        assert!((snap.latency.avg_ms - 200.0).abs() < f64::EPSILON);
        assert!((snap.error_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_timeout_error_does_not_count_as_timeout() {
        let m = InferenceMetrics::new();
        m.record_inference_error(Duration::from_millis(5), false);
        assert_eq!(m.snapshot().inference_timeouts, 0);
        assert_eq!(m.inference_errors(), 1);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let m = Arc::new(InferenceMetrics::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = m.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    m.record_chat_request();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(m.snapshot().chat_requests, 800);
    }

    #[test]
    fn snapshot_serializes() {
        let json = serde_json::to_value(InferenceMetrics::new().snapshot()).unwrap();
        assert!(json.get("latency").is_some());
        assert!(json.get("since").is_some());
    }
}
