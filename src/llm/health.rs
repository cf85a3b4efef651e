use super::traits::CompletionProvider;
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Bounded-latency liveness check reduced to a boolean.
#[derive(Debug, Clone, Copy)]
pub struct HealthProbe {
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `true` only if the provider's listing call succeeded within the
    /// timeout. Timeouts, error statuses and network failures are `false`.
    pub async fn probe(&self, provider: &dyn CompletionProvider) -> bool {
        match tokio::time::timeout(self.timeout, provider.probe()).await {
            Ok(Ok(())) => {
                tracing::debug!(provider = provider.name(), "probe ok");
                true
            }
            Ok(Err(e)) => {
                tracing::info!(provider = provider.name(), kind = %e.kind, "probe failed: {}", e.message);
                false
            }
            Err(_) => {
                tracing::info!(
                    provider = provider.name(),
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "probe timed out"
                );
                false
            }
        }
    }
}

impl Default for HealthProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}
