//! OpenAI-compatible chat completions adapter.
//! Serves OpenAI itself and Groq; any `/chat/completions` endpoint with
//! bearer auth works.

use super::classify::{ErrorKind, classify, parse_retry_after_header, parse_retry_hint};
use super::http_client::build_provider_client;
use super::scrub::sanitize_api_error;
use super::traits::{CompletionProvider, ProviderFuture};
use super::types::GenerationRequest;
use crate::error::ProviderError;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};

mod types;
use types::{ChatRequest, ChatResponse, ErrorEnvelope, Message};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct OpenAiCompatibleProvider {
    name: String,
    /// Pre-computed `Bearer <key>` value.
    cached_auth: Option<String>,
    cached_chat_url: String,
    cached_models_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self::with_client(name, base_url, api_key, build_provider_client())
    }

    pub fn with_client(name: &str, base_url: &str, api_key: Option<&str>, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let base_url = base_url.strip_suffix("/chat/completions").unwrap_or(base_url);
        Self {
            name: name.to_string(),
            cached_auth: api_key.map(|k| format!("Bearer {k}")),
            cached_chat_url: format!("{base_url}/chat/completions"),
            cached_models_url: format!("{base_url}/models"),
            client,
        }
    }

    /// Default endpoint for the providers we know by name.
    pub fn default_base_url(name: &str) -> Option<&'static str> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Some(OPENAI_BASE_URL),
            "groq" => Some(GROQ_BASE_URL),
            _ => None,
        }
    }

    fn auth(&self) -> Result<&str, ProviderError> {
        self.cached_auth.as_deref().ok_or_else(|| {
            ProviderError::new(
                ErrorKind::AuthError,
                &self.name,
                format!("{} API key not set", self.name),
            )
        })
    }

    fn build_request(model: &str, request: &GenerationRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        if !request.system.trim().is_empty() {
            messages.push(Message {
                role: "system",
                content: request.system.clone(),
            });
        }
        messages.extend(request.history.iter().map(|msg| Message {
            role: msg.role.label(),
            content: msg.content.clone(),
        }));
        messages.push(Message {
            role: "user",
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }

    async fn error_from_response(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let header_hint = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_header);
        let body = response.text().await.unwrap_or_default();
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();

        let (code, message) = match &envelope {
            Some(env) => (env.error.code(), env.error.message()),
            None => (None, body.as_str()),
        };
        let kind = classify(Some(status), code, message);
        let retry_after = header_hint.or_else(|| parse_retry_hint(message));

        ProviderError::new(kind, &self.name, sanitize_api_error(message))
            .with_status(status)
            .with_retry_after(retry_after)
    }

    async fn chat(&self, model: &str, request: &GenerationRequest) -> Result<String, ProviderError> {
        let auth = self.auth()?;
        let response = self
            .client
            .post(&self.cached_chat_url)
            .header(AUTHORIZATION, auth)
            .json(&Self::build_request(model, request))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.name, &e))?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(ErrorKind::MalformedResponse, &self.name, e.to_string()))?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(ProviderError::new(
                ErrorKind::MalformedResponse,
                &self.name,
                "no choices in response",
            ));
        };
        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ProviderError::new(
                ErrorKind::MalformedResponse,
                &self.name,
                format!(
                    "empty message content (finish reason {})",
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ),
            )),
        }
    }

    async fn list_models(&self) -> Result<(), ProviderError> {
        let auth = self.auth()?;
        let response = self
            .client
            .get(&self.cached_models_url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.name, &e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_from_response(response).await)
        }
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> ProviderFuture<'_, ()> {
        Box::pin(self.list_models())
    }

    fn invoke<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerationRequest,
    ) -> ProviderFuture<'a, String> {
        Box::pin(self.chat(model, request))
    }
}
