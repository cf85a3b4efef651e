use answer_relay::config::{Config, ProviderConfig};
use answer_relay::llm::{ProviderKind, ProviderRole};
use serde_json::{Value, json};
use wiremock::MockServer;

pub fn gemini(server: &MockServer, models: &[&str]) -> ProviderConfig {
    ProviderConfig {
        name: "gemini".into(),
        kind: ProviderKind::Gemini,
        api_key: Some("AIzaIntegrationKey".into()),
        base_url: Some(server.uri()),
        models: models.iter().map(|m| (*m).to_string()).collect(),
        role: ProviderRole::Primary,
    }
}

pub fn compatible(name: &str, server: &MockServer, model: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.into(),
        kind: ProviderKind::OpenaiCompatible,
        api_key: Some(format!("sk-{name}-integration")),
        base_url: Some(server.uri()),
        models: vec![model.into()],
        role: ProviderRole::Secondary,
    }
}

/// Config with fast backoff so retries do not slow the suite down.
pub fn config(providers: Vec<ProviderConfig>) -> Config {
    let mut config = Config {
        providers,
        ..Config::default()
    };
    config.reliability.initial_backoff_ms = 10;
    config.reliability.max_backoff_ms = 50;
    config.reliability.generation_timeout_secs = 5;
    config.health.probe_timeout_ms = 500;
    config
}

pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

pub fn gemini_error(code: u16, status: &str, message: &str) -> Value {
    json!({"error": {"code": code, "status": status, "message": message}})
}

pub fn chat_text(text: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
    })
}
