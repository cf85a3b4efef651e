use crate::llm::types::{ProviderKind, ProviderRole};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Providers in preference order.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            providers: default_providers(),
            reliability: ReliabilityConfig::default(),
            health: HealthConfig::default(),
            prompt: PromptConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

// ── Providers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override; adapters know the public default for gemini, openai and groq.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model tiers, most capable first.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub role: ProviderRole,
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "gemini".into(),
            kind: ProviderKind::Gemini,
            api_key: None,
            base_url: None,
            models: vec![
                "gemini-2.5-pro".into(),
                "gemini-1.5-pro".into(),
                "gemini-pro".into(),
            ],
            role: ProviderRole::Primary,
        },
        ProviderConfig {
            name: "openai".into(),
            kind: ProviderKind::OpenaiCompatible,
            api_key: None,
            base_url: None,
            models: vec!["gpt-4o-mini".into()],
            role: ProviderRole::Secondary,
        },
        ProviderConfig {
            name: "groq".into(),
            kind: ProviderKind::OpenaiCompatible,
            api_key: None,
            base_url: None,
            models: vec!["llama-3.1-8b-instant".into()],
            role: ProviderRole::Secondary,
        },
    ]
}

// ── Reliability ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Keep retrying transient failures on the final provider instead of
    /// giving up after one attempt.
    #[serde(default = "default_true")]
    pub retry_on_last_provider: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    5_000
}

fn default_max_backoff_ms() -> u64 {
    120_000
}

fn default_generation_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            generation_timeout_secs: default_generation_timeout_secs(),
            retry_on_last_provider: true,
        }
    }
}

// ── Health ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_status_ttl_secs")]
    pub status_ttl_secs: u64,
    /// Run (or reuse) a handshake before every answer to order providers.
    #[serde(default)]
    pub refresh_before_answer: bool,
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_status_ttl_secs() -> u64 {
    180
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            status_ttl_secs: default_status_ttl_secs(),
            refresh_before_answer: false,
        }
    }
}

// ── Prompt ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_system_prompt() -> String {
    crate::llm::prompt::DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

// ── Delivery gateway ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the messaging gateway; delivery is disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_gateway_timeout_secs(),
        }
    }
}
