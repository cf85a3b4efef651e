use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest {
    pub(super) model: String,
    pub(super) messages: Vec<Message>,
    pub(super) temperature: f64,
    pub(super) max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct Message {
    pub(super) role: &'static str,
    pub(super) content: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub(super) choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Choice {
    pub(super) message: ResponseMessage,
    pub(super) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponseMessage {
    #[serde(default)]
    pub(super) content: Option<String>,
}

/// `{"error": {"message", "type", "code"}}`. Some gateways send `error` as a
/// bare string, and `code` may be a number.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub(super) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ErrorBody {
    Structured {
        #[serde(default)]
        message: String,
        #[serde(rename = "type")]
        kind: Option<String>,
        code: Option<Value>,
    },
    Text(String),
}

impl ErrorBody {
    pub(super) fn message(&self) -> &str {
        match self {
            Self::Structured { message, .. } => message,
            Self::Text(text) => text,
        }
    }

    /// `code` when it is a string, else `type`.
    pub(super) fn code(&self) -> Option<&str> {
        match self {
            Self::Structured { kind, code, .. } => code
                .as_ref()
                .and_then(Value::as_str)
                .or(kind.as_deref()),
            Self::Text(_) => None,
        }
    }
}
