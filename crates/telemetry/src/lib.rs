//! Inference counters and latency tracking for Folio.
//!
//! One [`InferenceMetrics`] instance is shared (behind `Arc`) by the metered
//! model client, the chat orchestrator, and the gateway's `/metrics` route.
//! All updates are lock-free atomics so concurrent requests never contend.

pub mod engine;
pub mod model;

pub use engine::InferenceMetrics;
pub use model::{LatencySummary, MetricsSnapshot};
