//! Background health monitoring of the model backend.
//!
//! State machine:
//!
//! ```text
//! unknown ──success──▶ healthy ◀──success── degraded
//!    │                    │                    ▲
//!    └──── N consecutive failures ─────────────┘
//! ```
//!
//! The monitor runs as its own task. Request handling only reads the current
//! status; it never waits on a probe.

use chrono::{DateTime, Utc};
use folio_config::HealthConfig;
use folio_core::InferenceClient;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// No probe has succeeded or crossed the failure threshold yet.
    Unknown,
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
        }
    }

    /// Whether a chat request should try the model. Unknown counts as yes.
    pub fn allows_inference(&self) -> bool {
        !matches!(self, Self::Degraded)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable view of the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub provider: String,
    pub model: String,
    pub consecutive_failures: u32,
    pub probes_total: u64,
    pub probe_failures_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_probe: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct ProbeState {
    status: HealthStatus,
    consecutive_failures: u32,
    last_probe: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

pub struct HealthMonitor {
    client: Arc<dyn InferenceClient>,
    config: HealthConfig,
    state: RwLock<ProbeState>,
    probes_total: AtomicU64,
    probe_failures_total: AtomicU64,
}

impl HealthMonitor {
    pub fn new(client: Arc<dyn InferenceClient>, config: HealthConfig) -> Self {
        Self {
            client,
            config,
            state: RwLock::new(ProbeState {
                status: HealthStatus::Unknown,
                consecutive_failures: 0,
                last_probe: None,
                last_error: None,
            }),
            probes_total: AtomicU64::new(0),
            probe_failures_total: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.state.read().unwrap_or_else(|e| e.into_inner()).status
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        HealthSnapshot {
            status: state.status,
            provider: self.client.name().to_string(),
            model: self.client.model().to_string(),
            consecutive_failures: state.consecutive_failures,
            probes_total: self.probes_total.load(Ordering::Relaxed),
            probe_failures_total: self.probe_failures_total.load(Ordering::Relaxed),
            last_probe: state.last_probe,
            last_error: state.last_error.clone(),
        }
    }

    /// Apply a successful probe. Any state becomes healthy.
    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.status != HealthStatus::Healthy {
            info!(
                from = %state.status,
                provider = %self.client.name(),
                "Inference backend healthy"
            );
        }
        state.status = HealthStatus::Healthy;
        state.consecutive_failures = 0;
        state.last_probe = Some(Utc::now());
        state.last_error = None;
    }

    /// Apply a failed probe. Degrades once the failure threshold is reached.
    pub fn record_failure(&self, error: impl Into<String>) {
        let error = error.into();
        self.probe_failures_total.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_probe = Some(Utc::now());

        if state.consecutive_failures >= self.config.failure_threshold
            && state.status != HealthStatus::Degraded
        {
            warn!(
                failures = state.consecutive_failures,
                provider = %self.client.name(),
                error = %error,
                "Inference backend degraded, serving fallback answers"
            );
            state.status = HealthStatus::Degraded;
        } else {
            debug!(failures = state.consecutive_failures, error = %error, "Health probe failed");
        }
        state.last_error = Some(error);
    }

    /// Run one probe, bounded by `probe_timeout_secs`, and apply the result.
    /// Returns whether the probe succeeded.
    pub async fn probe(&self) -> bool {
        self.probes_total.fetch_add(1, Ordering::Relaxed);
        let timeout = Duration::from_secs(self.config.probe_timeout_secs);

        let failure = match tokio::time::timeout(timeout, self.client.health_check()).await {
            Ok(Ok(true)) => None,
            Ok(Ok(false)) => Some("backend reachable but not ready".to_string()),
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!(
                "health probe timed out after {}s",
                self.config.probe_timeout_secs
            )),
        };

        match failure {
            None => {
                self.record_success();
                true
            }
            Some(error) => {
                self.record_failure(error);
                false
            }
        }
    }

    /// Delay before the next probe.
    ///
    /// The regular interval while healthy; after failures, exponential
    /// backoff from `backoff_base_secs`, capped at the interval. Never
    /// shorter than one second.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        let interval = Duration::from_secs(self.config.probe_interval_secs.max(1));
        if consecutive_failures == 0 {
            return interval;
        }
        let exp = (consecutive_failures - 1).min(16);
        let backoff = self.config.backoff_base_secs.saturating_mul(1u64 << exp);
        Duration::from_secs(backoff.max(1)).min(interval)
    }

    /// Probe forever: once immediately, then on the schedule from
    /// [`next_delay`](Self::next_delay).
    pub async fn run(self: Arc<Self>) {
        info!(
            provider = %self.client.name(),
            interval_secs = self.config.probe_interval_secs,
            "Health monitor started"
        );
        loop {
            self.probe().await;
            let failures = self.state.read().unwrap_or_else(|e| e.into_inner()).consecutive_failures;
            tokio::time::sleep(self.next_delay(failures)).await;
        }
    }

    /// Start [`run`](Self::run) on the runtime. Abort the handle to stop it.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{InferenceError, InferenceRequest, InferenceResponse};
    use std::sync::atomic::AtomicBool;

    /// Health follows a switch; probes can be made to hang.
    struct SwitchClient {
        up: AtomicBool,
        hang: AtomicBool,
    }

    impl SwitchClient {
        fn new(up: bool) -> Self {
            Self {
                up: AtomicBool::new(up),
                hang: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for SwitchClient {
        fn name(&self) -> &str {
            "switch"
        }

        fn model(&self) -> &str {
            "switch-model"
        }

        async fn generate(
            &self,
            _request: InferenceRequest,
        ) -> std::result::Result<InferenceResponse, InferenceError> {
            Err(InferenceError::NotConfigured("probe-only double".into()))
        }

        async fn health_check(&self) -> std::result::Result<bool, InferenceError> {
            if self.hang.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.up.load(Ordering::SeqCst) {
                Ok(true)
            } else {
                Err(InferenceError::Unavailable("connection refused".into()))
            }
        }
    }

    fn config() -> HealthConfig {
        HealthConfig {
            probe_interval_secs: 30,
            probe_timeout_secs: 5,
            failure_threshold: 3,
            backoff_base_secs: 2,
        }
    }

    fn monitor(up: bool) -> (Arc<SwitchClient>, Arc<HealthMonitor>) {
        let client = Arc::new(SwitchClient::new(up));
        let monitor = Arc::new(HealthMonitor::new(client.clone(), config()));
        (client, monitor)
    }

    #[test]
    fn starts_unknown_and_allows_inference() {
        let (_, m) = monitor(true);
        assert_eq!(m.status(), HealthStatus::Unknown);
        assert!(m.status().allows_inference());
    }

    #[test]
    fn degrades_after_threshold() {
        let (_, m) = monitor(true);
        m.record_failure("boom");
        m.record_failure("boom");
        assert_eq!(m.status(), HealthStatus::Unknown);
        m.record_failure("boom");
        assert_eq!(m.status(), HealthStatus::Degraded);
        assert!(!m.status().allows_inference());
    }

    #[test]
    fn healthy_tolerates_failures_below_threshold() {
        let (_, m) = monitor(true);
        m.record_success();
        m.record_failure("blip");
        m.record_failure("blip");
        assert_eq!(m.status(), HealthStatus::Healthy);
    }

    #[test]
    fn one_success_recovers() {
        let (_, m) = monitor(true);
        for _ in 0..5 {
            m.record_failure("down");
        }
        assert_eq!(m.status(), HealthStatus::Degraded);
        m.record_success();
        let snap = m.snapshot();
        assert_eq!(snap.status, HealthStatus::Healthy);
        assert_eq!(snap.consecutive_failures, 0);
        assert!(snap.last_error.is_none());
        assert_eq!(snap.probe_failures_total, 5);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let (_, m) = monitor(true);
        assert_eq!(m.next_delay(0), Duration::from_secs(30));
        assert_eq!(m.next_delay(1), Duration::from_secs(2));
        assert_eq!(m.next_delay(2), Duration::from_secs(4));
        assert_eq!(m.next_delay(3), Duration::from_secs(8));
        assert_eq!(m.next_delay(4), Duration::from_secs(16));
        assert_eq!(m.next_delay(5), Duration::from_secs(30));
        assert_eq!(m.next_delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn zero_backoff_still_waits_a_second() {
        let client = Arc::new(SwitchClient::new(false));
        let m = HealthMonitor::new(
            client,
            HealthConfig {
                backoff_base_secs: 0,
                ..config()
            },
        );
        assert_eq!(m.next_delay(1), Duration::from_secs(1));
        assert_eq!(m.next_delay(4), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn probe_applies_result() {
        let (client, m) = monitor(true);
        assert!(m.probe().await);
        assert_eq!(m.status(), HealthStatus::Healthy);

        client.up.store(false, Ordering::SeqCst);
        assert!(!m.probe().await);
        let snap = m.snapshot();
        assert_eq!(snap.consecutive_failures, 1);
        assert!(snap.last_error.unwrap().contains("connection refused"));
        assert_eq!(snap.probes_total, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_times_out_as_failure() {
        let (client, m) = monitor(true);
        client.hang.store(true, Ordering::SeqCst);
        assert!(!m.probe().await);
        assert!(m.snapshot().last_error.unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_degrades_and_recovers() {
        let (client, m) = monitor(false);
        let handle = m.spawn();

        // Probes at t=0, 2, 6: the third failure degrades.
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(m.status(), HealthStatus::Degraded);

        // Next probe at t=14.
        client.up.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(m.status(), HealthStatus::Healthy);

        handle.abort();
    }

    #[test]
    fn snapshot_serializes_status_lowercase() {
        let (_, m) = monitor(true);
        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["model"], "switch-model");
    }
}
