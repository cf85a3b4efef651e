//! Ordered walk over providers and their model tiers.
//!
//! The walk is sequential per request. The first non-empty answer wins; every
//! failure on the way is logged and kept as a diagnostic, and when nothing
//! answers the caller gets the safe default rather than an error.

use super::classify::ErrorKind;
use super::handshake::ordering;
use super::invoker::CompletionInvoker;
use super::registry::{ProviderRegistry, ProviderSlot};
use super::retry::RetryPolicy;
use super::status_cache::StatusCache;
use super::types::{AnswerReply, GenerationOutcome, GenerationRequest};
use std::sync::Arc;

pub struct FallbackSequencer {
    registry: Arc<ProviderRegistry>,
    cache: Option<Arc<StatusCache>>,
    invoker: CompletionInvoker,
    retry: RetryPolicy,
    retry_on_last_provider: bool,
}

/// What the walk does after a tier failed for good.
enum Next {
    Tier,
    Provider,
}

impl FallbackSequencer {
    pub fn new(registry: Arc<ProviderRegistry>, invoker: CompletionInvoker, retry: RetryPolicy) -> Self {
        Self {
            registry,
            cache: None,
            invoker,
            retry,
            retry_on_last_provider: true,
        }
    }

    /// Read provider ordering from the handshake cache. Stale snapshots are
    /// still used; the sequencer never probes on its own.
    #[must_use]
    pub fn with_status_cache(mut self, cache: Arc<StatusCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_retry_on_last_provider(mut self, enabled: bool) -> Self {
        self.retry_on_last_provider = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Walk providers until one answers. Never fails.
    pub async fn answer(&self, request: &GenerationRequest) -> AnswerReply {
        let snapshot = self.cache.as_ref().and_then(|cache| cache.get());
        let order = ordering(&self.registry, snapshot.as_deref());
        let slots = self.registry.slots();
        let last_configured = order.iter().rev().copied().find(|&i| slots[i].is_configured());

        let mut failures = Vec::new();
        for index in order {
            let slot = &slots[index];
            if !slot.is_configured() {
                tracing::debug!(provider = slot.name(), "skipping unconfigured provider");
                continue;
            }

            let policy = if !self.retry_on_last_provider && Some(index) == last_configured {
                self.retry.single_attempt()
            } else {
                self.retry
            };

            if let Some(reply) = self.try_provider(slot, policy, request, &mut failures).await {
                return reply;
            }
        }

        if failures.is_empty() {
            tracing::warn!("no provider is configured; returning safe default");
        } else {
            tracing::warn!(attempts = failures.len(), "all providers failed; returning safe default");
        }
        AnswerReply::safe_default(failures)
    }

    async fn try_provider(
        &self,
        slot: &ProviderSlot,
        policy: RetryPolicy,
        request: &GenerationRequest,
        failures: &mut Vec<GenerationOutcome>,
    ) -> Option<AnswerReply> {
        let adapter = slot.adapter();
        for model in slot.models() {
            let result = policy
                .run(|_| self.invoker.invoke(adapter, model, request))
                .await;

            let err = match result {
                Ok(text) => {
                    tracing::info!(provider = slot.name(), model = model.as_str(), "answer generated");
                    let outcome = GenerationOutcome::Success {
                        text,
                        provider: slot.name().to_string(),
                        model: model.clone(),
                    };
                    return AnswerReply::answered(outcome, std::mem::take(failures));
                }
                Err(err) => err,
            };

            tracing::warn!(
                provider = slot.name(),
                model = model.as_str(),
                kind = %err.kind,
                "generation failed: {}",
                err.message
            );
            let next = next_step(slot, err.kind);
            failures.push(GenerationOutcome::Failure {
                provider: slot.name().to_string(),
                model: Some(model.clone()),
                kind: err.kind,
                message: err.message,
            });
            if matches!(next, Next::Provider) {
                return None;
            }
        }
        None
    }
}

fn next_step(slot: &ProviderSlot, kind: ErrorKind) -> Next {
    match kind {
        ErrorKind::ModelUnavailable => Next::Tier,
        ErrorKind::AuthError => {
            slot.revoke();
            Next::Provider
        }
        ErrorKind::QuotaExceeded
        | ErrorKind::Timeout
        | ErrorKind::NetworkError
        | ErrorKind::MalformedResponse => Next::Provider,
    }
}
