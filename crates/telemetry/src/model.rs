//! Serializable views of the metric counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate latency of completed inference calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Calls that produced a latency sample (successes and failures).
    pub samples: u64,
    pub avg_ms: f64,
    pub max_ms: u64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Chat requests handled by the orchestrator.
    pub chat_requests: u64,
    /// Generation calls sent to the model backend.
    pub inference_requests: u64,
    /// Generation calls that failed for any reason.
    pub inference_errors: u64,
    /// Subset of `inference_errors` caused by the client timeout.
    pub inference_timeouts: u64,
    /// Answers served from the canned fallback table.
    pub fallbacks: u64,
    /// Total characters of generated text.
    pub response_chars: u64,
    pub latency: LatencySummary,
    pub since: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// Fraction of inference calls that failed, 0.0 when none were made.
    pub fn error_rate(&self) -> f64 {
        if self.inference_requests == 0 {
            0.0
        } else {
            self.inference_errors as f64 / self.inference_requests as f64
        }
    }
}
