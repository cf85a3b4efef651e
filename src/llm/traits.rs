use super::types::GenerationRequest;
use crate::error::ProviderError;
use std::future::Future;
use std::pin::Pin;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Pluggable adapter for one completion backend: a cheap liveness call and
/// the actual generation call. Both report failures already classified.
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier (e.g. "gemini", "groq").
    fn name(&self) -> &str;

    /// Cheapest call that proves the endpoint and credential work
    /// (a model listing, never a generation).
    fn probe(&self) -> ProviderFuture<'_, ()>;

    /// Generate text for `request` with the given model tier.
    fn invoke<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerationRequest,
    ) -> ProviderFuture<'a, String>;
}
