//! Client for the external messaging gateway (`POST {base}/send`).

use super::attachment::{Attachment, AttachmentKind};
use super::destination::normalize_destination;
use crate::error::TransportError;
use crate::llm::build_provider_client_with_timeout;
use crate::llm::scrub::sanitize_api_error;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub destination: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
    /// Operator the gateway attributes the message to.
    pub agent: Option<String>,
}

impl OutboundMessage {
    pub fn text(destination: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            text: text.into(),
            attachments: Vec::new(),
            agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub jid: String,
    pub message_id: Option<String>,
    /// One id per delivered part (text plus each attachment).
    pub message_ids: Vec<String>,
}

pub trait MessageGateway: Send + Sync {
    fn name(&self) -> &str;

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, TransportError>> + Send + 'a>>;
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    jid: &'a str,
    mensagem: &'a str,
    imagens: Vec<&'a Attachment>,
    videos: Vec<&'a Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agente: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    ok: bool,
    message_id: Option<String>,
    #[serde(default)]
    message_ids: Vec<String>,
    error: Option<String>,
}

pub struct HttpGateway {
    send_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            send_url: format!("{}/send", base_url.trim().trim_end_matches('/')),
            timeout,
            client: build_provider_client_with_timeout(timeout),
        }
    }

    /// `None` when no gateway URL is configured.
    pub fn from_config(config: &crate::config::GatewayConfig) -> Option<Self> {
        config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, Duration::from_secs(config.timeout_secs)))
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, TransportError> {
        let jid = normalize_destination(&message.destination)?;
        let (images, videos): (Vec<_>, Vec<_>) = message
            .attachments
            .iter()
            .partition(|a| a.kind == AttachmentKind::Image);
        let payload = SendPayload {
            jid: &jid,
            mensagem: &message.text,
            imagens: images,
            videos,
            agente: message.agent.as_deref(),
        };

        tracing::info!(
            jid = jid.as_str(),
            chars = message.text.chars().count(),
            images = payload.imagens.len(),
            videos = payload.videos.len(),
            "Sending message through gateway"
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.client.post(&self.send_url).json(&payload).send(),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.as_secs())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::SERVICE_UNAVAILABLE => TransportError::Disconnected,
                StatusCode::BAD_REQUEST => TransportError::InvalidDestination(jid),
                _ => TransportError::Http {
                    status: status.as_u16(),
                    body: sanitize_api_error(&body),
                },
            });
        }

        let data: SendResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Request(format!("unreadable gateway response: {e}")))?;
        if !data.ok {
            return Err(TransportError::Rejected(
                data.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }

        let message_ids = if data.message_ids.is_empty() {
            data.message_id.iter().cloned().collect()
        } else {
            data.message_ids
        };
        tracing::info!(jid = jid.as_str(), message_id = ?data.message_id, "Message delivered");
        Ok(DeliveryReceipt {
            jid,
            message_id: data.message_id,
            message_ids,
        })
    }
}

impl MessageGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, TransportError>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}
