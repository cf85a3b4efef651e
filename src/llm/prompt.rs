use super::types::{FormatHint, GenerationRequest, HistoryMessage};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the official support assistant. \
Answer using the conversation history and the knowledge-base context provided.\n\
- If the new question is ambiguous, use the history to work out what the user meant.\n\
- Be direct and clear, but natural and helpful.\n\
- If the user says they did not understand, rephrase your last answer more simply.\n\
- If the context does not cover the question, say: \"I couldn't find that in the available knowledge base.\"";

const NO_CONTEXT: &str = "No specific context was found.";

/// Generation knobs shared by every request.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub system_prompt: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.2,
            max_output_tokens: 1024,
        }
    }
}

/// Build the provider-independent request for one question.
///
/// Context and question go into the user prompt; history is kept as separate
/// turns so adapters can send it natively.
pub fn build_request(
    settings: &PromptSettings,
    question: &str,
    context: Option<&str>,
    history: &[HistoryMessage],
    format_hint: FormatHint,
) -> GenerationRequest {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CONTEXT);
    let prompt = format!(
        "### KNOWLEDGE BASE CONTEXT\n{context}\n\n### CURRENT QUESTION\n\"{}\"",
        question.trim()
    );

    let mut system = settings.system_prompt.trim().to_string();
    if let Some(rule) = format_rule(format_hint) {
        if !system.is_empty() {
            system.push('\n');
        }
        system.push_str(rule);
    }

    GenerationRequest {
        prompt,
        system,
        history: history
            .iter()
            .filter(|msg| !msg.content.trim().is_empty())
            .cloned()
            .collect(),
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
    }
}

fn format_rule(hint: FormatHint) -> Option<&'static str> {
    match hint {
        FormatHint::Plain => Some("- Reply in plain text without Markdown formatting."),
        FormatHint::Markdown => Some("- Format the reply as Markdown; use lists where they help."),
    }
}
