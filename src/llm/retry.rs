use super::classify::ErrorKind;
use crate::error::ProviderError;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(120);

/// Bookkeeping for one retry run; dropped when the run ends.
#[derive(Debug, Clone)]
pub struct RetryState {
    pub attempt: u32,
    pub next_delay: Duration,
}

/// Retry a single provider call on transient failures.
///
/// Quota, timeout and network failures are retried with exponential delay
/// (`initial_delay * 2^attempt`, capped at `max_delay`). When the provider
/// suggested a longer wait, that wait is honoured in full, unless it exceeds
/// `max_delay`: then the run ends with the error so the caller can move on.
/// Every other kind is returned immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Same delays, but never more than one attempt.
    #[must_use]
    pub fn single_attempt(self) -> Self {
        Self {
            max_attempts: 1,
            ..self
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the retry that follows failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32, suggested: Option<Duration>) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let exponential = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        match suggested {
            Some(hint) if hint > exponential => hint,
            _ => exponential,
        }
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut state = RetryState {
            attempt: 0,
            next_delay: self.initial_delay,
        };

        loop {
            let err = match op(state.attempt).await {
                Ok(value) => {
                    if state.attempt > 0 {
                        tracing::info!(attempt = state.attempt + 1, "Provider recovered after retries");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let remaining = state.attempt + 1 < self.max_attempts;
            if !err.kind.is_retryable() || !remaining {
                return Err(err);
            }
            if let Some(hint) = err.retry_after
                && hint > self.max_delay
            {
                tracing::warn!(
                    provider = err.provider.as_str(),
                    kind = %err.kind,
                    wait_secs = hint.as_secs_f64(),
                    max_delay_secs = self.max_delay.as_secs_f64(),
                    "Suggested wait exceeds backoff ceiling, giving up on this provider"
                );
                return Err(err);
            }

            state.next_delay = self.delay_for(state.attempt, err.retry_after);
            tracing::warn!(
                provider = err.provider.as_str(),
                kind = %err.kind,
                attempt = state.attempt + 1,
                max_attempts = self.max_attempts,
                wait_secs = state.next_delay.as_secs_f64(),
                "Provider call failed, retrying"
            );
            tokio::time::sleep(state.next_delay).await;
            state.attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY)
    }
}
