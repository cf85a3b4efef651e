//! Google Gemini adapter (`generativelanguage.googleapis.com`, v1beta).
//!
//! Auth is the `x-goog-api-key` header so the key never appears in URLs or
//! in logged request lines.

use super::classify::{ErrorKind, classify, parse_proto_duration, parse_retry_hint};
use super::http_client::build_provider_client;
use super::scrub::sanitize_api_error;
use super::traits::{CompletionProvider, ProviderFuture};
use super::types::{GenerationRequest, MessageRole};
use crate::error::ProviderError;
use reqwest::Client;

mod types;
use types::{Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiProvider {
    pub fn new(name: &str, base_url: Option<&str>, api_key: Option<&str>) -> Self {
        Self::with_client(name, base_url, api_key, build_provider_client())
    }

    pub fn with_client(
        name: &str,
        base_url: Option<&str>,
        api_key: Option<&str>,
        client: Client,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.map(String::from),
            client,
        }
    }

    fn model_path(model: &str) -> &str {
        model.strip_prefix("models/").unwrap_or(model)
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            Self::model_path(model)
        )
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or_else(|| {
            ProviderError::new(
                ErrorKind::AuthError,
                &self.name,
                "Gemini API key not set (GEMINI_API_KEY or providers.api_key)",
            )
        })
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let system_instruction = (!request.system.trim().is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(request.system.clone())],
        });

        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|msg| Content {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part::text(msg.content.clone())],
            })
            .collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(request.prompt.clone())],
        });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    fn extract_text(&self, response: &GenerateContentResponse) -> Result<String, ProviderError> {
        let text: String = response
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();
        if !text.trim().is_empty() {
            return Ok(text);
        }

        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .map(|r| format!("prompt blocked: {r}"))
            .or_else(|| {
                response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .map(|r| format!("no text, finish reason {r}"))
            })
            .unwrap_or_else(|| "no candidates in response".to_string());
        Err(ProviderError::new(ErrorKind::MalformedResponse, &self.name, reason))
    }

    /// Turn a non-2xx response into a classified error, reading the Google
    /// error envelope when there is one.
    async fn error_from_response(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();

        let (code, message, hinted) = match &envelope {
            Some(env) => (
                env.error.code(),
                env.error.message.as_str(),
                env.error.retry_delay().and_then(parse_proto_duration),
            ),
            None => (None, body.as_str(), None),
        };
        let kind = classify(Some(status), code, message);
        let retry_after = hinted.or_else(|| parse_retry_hint(message));

        ProviderError::new(kind, &self.name, sanitize_api_error(message))
            .with_status(status)
            .with_retry_after(retry_after)
    }

    async fn generate(&self, model: &str, request: &GenerationRequest) -> Result<String, ProviderError> {
        let key = self.api_key()?;
        let body = Self::build_request(request);
        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.name, &e))?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(ErrorKind::MalformedResponse, &self.name, e.to_string()))?;
        self.extract_text(&parsed)
    }

    async fn list_models(&self) -> Result<(), ProviderError> {
        let key = self.api_key()?;
        let response = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, key)
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

impl CompletionProvider for GeminiProvider {
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
        Box::pin(self.generate(model, request))
    }
}
