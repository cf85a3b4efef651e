use super::classify::ErrorKind;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Shown to the end user when every provider failed. Never empty, never a raw error.
pub const SAFE_DEFAULT_ANSWER: &str = "Sorry, I couldn't process your question right now. \
Please try rephrasing it, or try again in a moment. If the problem persists, contact our support team.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Role name in the OpenAI chat format.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// How the caller wants the answer laid out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FormatHint {
    #[default]
    Plain,
    Markdown,
}

/// Everything one generation call needs, independent of provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: String,
    pub history: Vec<HistoryMessage>,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProviderKind {
    Gemini,
    OpenaiCompatible,
}

/// `Primary` providers are tried before `Secondary` ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderRole {
    Primary,
    #[default]
    Secondary,
}

/// Static description of one provider, built from config at startup.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub name: String,
    pub kind: ProviderKind,
    pub credential: Option<String>,
    /// Model tiers, most capable first.
    pub models: Vec<String>,
    pub role: ProviderRole,
    pub base_url: Option<String>,
}

/// Result of one provider/model attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success {
        text: String,
        provider: String,
        model: String,
    },
    Failure {
        provider: String,
        model: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

/// Caller-facing answer. Always present; `success` is false when the text is
/// the safe default.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerReply {
    pub text: String,
    pub provider_used: Option<String>,
    pub model_used: Option<String>,
    pub success: bool,
    pub failures: Vec<GenerationOutcome>,
}

impl AnswerReply {
    /// Reply for a successful outcome; `None` for a failure.
    pub fn answered(outcome: GenerationOutcome, failures: Vec<GenerationOutcome>) -> Option<Self> {
        match outcome {
            GenerationOutcome::Success {
                text,
                provider,
                model,
            } => Some(Self {
                text,
                provider_used: Some(provider),
                model_used: Some(model),
                success: true,
                failures,
            }),
            GenerationOutcome::Failure { .. } => None,
        }
    }

    pub fn safe_default(failures: Vec<GenerationOutcome>) -> Self {
        Self {
            text: SAFE_DEFAULT_ANSWER.to_string(),
            provider_used: None,
            model_used: None,
            success: false,
            failures,
        }
    }
}
