use crate::llm::ErrorKind;
use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `answer-relay`.
///
/// The answering path never surfaces these to its caller (it degrades to a
/// safe default instead); they exist for configuration, delivery and the
/// per-provider diagnostics the sequencer collects.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Delivery gateway ────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("provider `{0}` needs a base_url")]
    MissingBaseUrl(String),
}

/// A single failed provider call, already classified.
///
/// Adapters build these from the HTTP status, the provider's own error code
/// and the (sanitized) error body. `retry_after` carries any wait the provider
/// suggested, whether it came from a header, a structured field or the text.
#[derive(Debug, Clone, Error)]
#[error("{provider} {kind}: {message}")]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub provider: String,
    pub status: Option<u16>,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl ProviderError {
    pub fn new(kind: ErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider: provider.into(),
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn timeout(provider: impl Into<String>, after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            provider,
            format!("no response within {}ms", after.as_millis()),
        )
    }

    /// Map a transport-level `reqwest` failure (no HTTP response) onto the taxonomy.
    pub fn from_reqwest(provider: impl Into<String>, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_decode() {
            ErrorKind::MalformedResponse
        } else {
            ErrorKind::NetworkError
        };
        Self::new(kind, provider, err.to_string())
    }
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("delivery gateway is not configured")]
    NotConfigured,

    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("messaging session disconnected")]
    Disconnected,

    #[error("gateway timed out after {0}s")]
    Timeout(u64),

    #[error("gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("gateway rejected message: {0}")]
    Rejected(String),

    #[error("gateway request failed: {0}")]
    Request(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RelayError>;
