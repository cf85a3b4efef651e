use super::classify::ErrorKind;
use super::traits::CompletionProvider;
use super::types::GenerationRequest;
use crate::error::ProviderError;
use std::time::Duration;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// One generation call against one provider and model, bounded in time.
#[derive(Debug, Clone, Copy)]
pub struct CompletionInvoker {
    timeout: Duration,
}

impl CompletionInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Non-empty trimmed text on success. An empty reply is a malformed
    /// response, never an answer.
    pub async fn invoke(
        &self,
        provider: &dyn CompletionProvider,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let text = tokio::time::timeout(self.timeout, provider.invoke(model, request))
            .await
            .map_err(|_| ProviderError::timeout(provider.name(), self.timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::new(
                ErrorKind::MalformedResponse,
                provider.name(),
                format!("{model} returned no text"),
            ));
        }
        Ok(text.to_string())
    }
}

impl Default for CompletionInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_TIMEOUT)
    }
}
