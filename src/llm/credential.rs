use super::types::ProviderDescriptor;

/// Template values that ship in example env files and must never count as a key.
const KNOWN_PLACEHOLDERS: [&str; 8] = [
    "your_gemini_api_key_here",
    "your_openai_api_key_here",
    "your_groq_api_key_here",
    "your_api_key_here",
    "your-api-key",
    "<api-key>",
    "changeme",
    "xxx",
];

/// True for empty values, known template strings, and any `your_*_here` form.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    if KNOWN_PLACEHOLDERS.contains(&lower.as_str()) {
        return true;
    }
    lower.starts_with("your_") && lower.ends_with("_here")
}

/// A credential value is usable iff it is present and not a placeholder.
pub fn credential_is_usable(credential: Option<&str>) -> bool {
    credential.is_some_and(|value| !is_placeholder(value))
}

/// Whether `provider` may take part in handshakes and answer attempts.
/// Pure; runtime revocation after an auth failure is layered on by the registry.
pub fn is_configured(provider: &ProviderDescriptor) -> bool {
    !provider.models.is_empty() && credential_is_usable(provider.credential.as_deref())
}
