// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod classify;
pub mod credential;
pub mod http_client;
pub mod prompt;
pub mod scrub;
pub mod traits;
pub mod types;

// ── Orchestration layers ────────────────────────────────────────────────────
pub mod factory;
pub mod handshake;
pub mod health;
pub mod invoker;
pub mod registry;
pub mod retry;
pub mod sequencer;
pub mod status_cache;

// ── Provider implementations ────────────────────────────────────────────────
pub mod compatible;
pub mod gemini;

// ── Infrastructure re-exports ───────────────────────────────────────────────
pub use classify::{ErrorKind, classify};
pub use credential::is_configured;
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use prompt::{PromptSettings, build_request};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::{CompletionProvider, ProviderFuture};
pub use types::{
    AnswerReply, FormatHint, GenerationOutcome, GenerationRequest, HistoryMessage, MessageRole,
    ProviderDescriptor, ProviderKind, ProviderRole, SAFE_DEFAULT_ANSWER,
};

// ── Orchestration re-exports ────────────────────────────────────────────────
pub use handshake::{HandshakeCoordinator, ordering};
pub use health::HealthProbe;
pub use invoker::CompletionInvoker;
pub use registry::{ProviderRegistry, ProviderSlot};
pub use retry::{RetryPolicy, RetryState};
pub use sequencer::FallbackSequencer;
pub use status_cache::{Clock, HealthSnapshot, ManualClock, ProviderHealth, StatusCache, SystemClock};

// ── Provider + factory re-exports ───────────────────────────────────────────
pub use compatible::OpenAiCompatibleProvider;
pub use factory::{build_registry, create_provider, create_sequencer};
pub use gemini::GeminiProvider;
