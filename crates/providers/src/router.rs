//! Build the configured inference client.

use crate::{MeteredClient, OllamaClient, OpenAiCompatClient};
use folio_config::{AppConfig, InferenceConfig};
use folio_core::error::InferenceError;
use folio_core::inference::InferenceClient;
use folio_telemetry::InferenceMetrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The raw backend client for `[inference]`, without metering.
pub fn build_client(config: &InferenceConfig) -> Result<Arc<dyn InferenceClient>, InferenceError> {
    let client: Arc<dyn InferenceClient> = match config.provider.as_str() {
        "ollama" => Arc::new(OllamaClient::new(&config.base_url, &config.model)),
        "openai" => Arc::new(
            OpenAiCompatClient::new("openai", &config.base_url, &config.model)
                .with_api_key(config.api_key.clone()),
        ),
        other => {
            return Err(InferenceError::NotConfigured(format!(
                "Unknown inference provider: {other}"
            )));
        }
    };
    Ok(client)
}

/// The client the chat path uses: the configured backend behind a
/// [`MeteredClient`] with `inference.timeout_secs`.
pub fn build_from_config(
    config: &AppConfig,
    metrics: Arc<InferenceMetrics>,
) -> Result<Arc<dyn InferenceClient>, InferenceError> {
    let inner = build_client(&config.inference)?;
    info!(
        provider = %inner.name(),
        model = %inner.model(),
        base_url = %config.inference.base_url,
        "Inference client configured"
    );
    Ok(Arc::new(MeteredClient::new(
        inner,
        Duration::from_secs(config.inference.timeout_secs),
        metrics,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let client = build_from_config(&config, Arc::new(InferenceMetrics::new())).unwrap();
        assert_eq!(client.name(), "ollama");
        assert_eq!(client.model(), "bruno-sre");
    }

    #[test]
    fn openai_provider() {
        let mut config = AppConfig::default();
        config.inference.provider = "openai".into();
        config.inference.base_url = "http://localhost:8000/v1".into();
        config.inference.model = "llama3.1:8b".into();
        let client = build_client(&config.inference).unwrap();
        assert_eq!(client.name(), "openai");
        assert_eq!(client.model(), "llama3.1:8b");
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let mut config = AppConfig::default();
        config.inference.provider = "carrier-pigeon".into();
        assert!(matches!(
            build_client(&config.inference),
            Err(InferenceError::NotConfigured(_))
        ));
    }
}
