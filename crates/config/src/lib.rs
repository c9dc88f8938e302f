//! Configuration loading, validation, and management for Folio.
//!
//! Loads configuration from `~/.folio/config.toml` (or an explicit path) with
//! environment variable overrides. Every field has a default, so an empty or
//! missing file yields a working local setup: Ollama on `localhost:11434` and
//! a SQLite profile database under the config directory.

use folio_core::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.folio/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Whose profile the assistant talks about (used in the persona preamble)
    #[serde(default = "default_profile_name")]
    pub profile_name: String,

    /// Model backend settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Health monitor settings
    #[serde(default)]
    pub health: HealthConfig,

    /// Prompt assembly settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Per-category retrieval caps
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Profile data store
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Canned answer overrides
    #[serde(default)]
    pub fallback: FallbackConfig,
}

fn default_profile_name() -> String {
    "Bruno".into()
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("profile_name", &self.profile_name)
            .field("inference", &self.inference)
            .field("health", &self.health)
            .field("prompt", &self.prompt)
            .field("retrieval", &self.retrieval)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// "ollama" or "openai" (any OpenAI-compatible server)
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Only sent by the OpenAI-compatible client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Hard bound on a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "bruno-sre".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    1000
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl InferenceConfig {
    /// Sampling options sent with every generation call. `max_tokens = 0`
    /// leaves the length to the backend.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: Some(self.max_tokens).filter(|&n| n > 0),
        }
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Seconds between probes while the backend is healthy
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Consecutive failed probes before the backend is marked degraded
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// First retry delay after a failed probe; doubles up to the probe interval
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,
}

fn default_probe_interval() -> u64 {
    30
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_failure_threshold() -> u32 {
    3
}
fn default_backoff_base() -> u64 {
    2
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
            failure_threshold: default_failure_threshold(),
            backoff_base_secs: default_backoff_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Upper bound on the assembled prompt, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Replace the built-in persona preamble
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

fn default_max_chars() -> usize {
    12_000
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            persona: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_skills_limit")]
    pub skills_limit: usize,

    #[serde(default = "default_projects_limit")]
    pub projects_limit: usize,

    #[serde(default = "default_true")]
    pub featured_projects_only: bool,
}

fn default_skills_limit() -> usize {
    20
}
fn default_projects_limit() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            skills_limit: default_skills_limit(),
            projects_limit: default_projects_limit(),
            featured_projects_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory" (built-in demo profile)
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path; defaults to `<config dir>/profile.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// The effective database location.
    pub fn database_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::config_dir().join("profile.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Browser origins allowed to call the API (the portfolio site)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Category name → canned answer. Unknown names are ignored with a warning.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, String>,
}

/// Environment variables consulted by [`AppConfig::apply_env`], highest
/// priority first within each group.
const ENV_BASE_URL: &[&str] = &["FOLIO_INFERENCE_URL", "OLLAMA_URL"];
const ENV_MODEL: &[&str] = &["FOLIO_MODEL", "MODEL_NAME"];
const ENV_PROVIDER: &[&str] = &["FOLIO_PROVIDER"];
const ENV_API_KEY: &[&str] = &["FOLIO_API_KEY"];
const ENV_DATABASE: &[&str] = &["FOLIO_DATABASE"];

impl AppConfig {
    /// Load configuration from the default path (~/.folio/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| lookup(*k))
                .find(|v| !v.trim().is_empty())
        };

        if let Some(url) = first(ENV_BASE_URL) {
            self.inference.base_url = url;
        }
        if let Some(model) = first(ENV_MODEL) {
            self.inference.model = model;
        }
        if let Some(provider) = first(ENV_PROVIDER) {
            self.inference.provider = provider;
        }
        if let Some(key) = first(ENV_API_KEY) {
            self.inference.api_key = Some(key);
        }
        if let Some(path) = first(ENV_DATABASE) {
            self.store.path = Some(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".folio")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ConfigError::ValidationError(
                "inference.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.inference.top_p) {
            return Err(ConfigError::ValidationError(
                "inference.top_p must be between 0.0 and 1.0".into(),
            ));
        }
        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_secs must be > 0".into(),
            ));
        }
        if !matches!(self.inference.provider.as_str(), "ollama" | "openai") {
            return Err(ConfigError::ValidationError(format!(
                "inference.provider must be \"ollama\" or \"openai\", got \"{}\"",
                self.inference.provider
            )));
        }
        if self.health.backoff_base_secs == 0 {
            return Err(ConfigError::ValidationError(
                "health.backoff_base_secs must be > 0".into(),
            ));
        }
        if self.health.failure_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "health.failure_threshold must be >= 1".into(),
            ));
        }
        if self.health.probe_interval_secs == 0 || self.health.probe_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "health probe interval and timeout must be > 0".into(),
            ));
        }
        if self.prompt.max_chars < 256 {
            return Err(ConfigError::ValidationError(
                "prompt.max_chars must be at least 256".into(),
            ));
        }
        if !matches!(self.store.backend.as_str(), "sqlite" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be \"sqlite\" or \"memory\", got \"{}\"",
                self.store.backend
            )));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_name: default_profile_name(),
            inference: InferenceConfig::default(),
            health: HealthConfig::default(),
            prompt: PromptConfig::default(),
            retrieval: RetrievalConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
