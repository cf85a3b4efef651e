//! Wire config into the provider registry and the answering pipeline.

use super::compatible::OpenAiCompatibleProvider;
use super::gemini::GeminiProvider;
use super::health::HealthProbe;
use super::invoker::CompletionInvoker;
use super::prompt::PromptSettings;
use super::registry::{ProviderRegistry, ProviderSlot};
use super::retry::RetryPolicy;
use super::sequencer::FallbackSequencer;
use super::status_cache::StatusCache;
use super::traits::CompletionProvider;
use super::types::{ProviderDescriptor, ProviderKind};
use crate::config::{Config, HealthConfig, PromptConfig, ProviderConfig, ReliabilityConfig};
use crate::error::LlmError;
use std::sync::Arc;
use std::time::Duration;

pub fn descriptor(config: &ProviderConfig) -> ProviderDescriptor {
    ProviderDescriptor {
        name: config.name.trim().to_string(),
        kind: config.kind,
        credential: config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from),
        models: config
            .models
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect(),
        role: config.role,
        base_url: config.base_url.clone(),
    }
}

pub fn create_provider(descriptor: &ProviderDescriptor) -> Result<Arc<dyn CompletionProvider>, LlmError> {
    let key = descriptor.credential.as_deref();
    let provider: Arc<dyn CompletionProvider> = match descriptor.kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            &descriptor.name,
            descriptor.base_url.as_deref(),
            key,
        )),
        ProviderKind::OpenaiCompatible => {
            let base_url = descriptor
                .base_url
                .as_deref()
                .or_else(|| OpenAiCompatibleProvider::default_base_url(&descriptor.name))
                .ok_or_else(|| LlmError::MissingBaseUrl(descriptor.name.clone()))?;
            Arc::new(OpenAiCompatibleProvider::new(&descriptor.name, base_url, key))
        }
    };
    Ok(provider)
}

/// Build every configured provider in preference order.
pub fn build_registry(providers: &[ProviderConfig]) -> Result<ProviderRegistry, LlmError> {
    let slots = providers
        .iter()
        .map(|config| {
            let descriptor = descriptor(config);
            let adapter = create_provider(&descriptor)?;
            Ok(ProviderSlot::new(descriptor, adapter))
        })
        .collect::<Result<Vec<_>, LlmError>>()?;
    let registry = ProviderRegistry::new(slots);
    tracing::debug!(
        providers = registry.len(),
        configured = registry.configured().count(),
        "Provider registry built"
    );
    Ok(registry)
}

pub fn retry_policy(config: &ReliabilityConfig) -> RetryPolicy {
    RetryPolicy::new(
        config.max_attempts,
        Duration::from_millis(config.initial_backoff_ms),
    )
    .with_max_delay(Duration::from_millis(config.max_backoff_ms))
}

pub fn invoker(config: &ReliabilityConfig) -> CompletionInvoker {
    CompletionInvoker::new(Duration::from_secs(config.generation_timeout_secs))
}

pub fn health_probe(config: &HealthConfig) -> HealthProbe {
    HealthProbe::new(Duration::from_millis(config.probe_timeout_ms))
}

pub fn status_cache(config: &HealthConfig) -> StatusCache {
    StatusCache::new(Duration::from_secs(config.status_ttl_secs))
}

pub fn prompt_settings(config: &PromptConfig) -> PromptSettings {
    PromptSettings {
        system_prompt: config.system_prompt.clone(),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
    }
}

pub fn create_sequencer(
    config: &Config,
    registry: Arc<ProviderRegistry>,
    cache: Arc<StatusCache>,
) -> FallbackSequencer {
    FallbackSequencer::new(registry, invoker(&config.reliability), retry_policy(&config.reliability))
        .with_status_cache(cache)
        .with_retry_on_last_provider(config.reliability.retry_on_last_provider)
}
