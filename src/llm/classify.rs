//! Failure taxonomy shared by every provider adapter.
//!
//! Retry and fallback decisions depend entirely on telling "rate limited"
//! apart from "wrong model name", so classification is a pure function of the
//! structured signals an adapter extracted (HTTP status, provider status/code
//! strings). Substring matching on the message is only consulted last.

use serde::Serialize;
use std::time::Duration;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    AuthError,
    QuotaExceeded,
    ModelUnavailable,
    Timeout,
    NetworkError,
    MalformedResponse,
}

impl ErrorKind {
    /// Kinds worth another attempt against the same provider and model.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::QuotaExceeded | Self::Timeout | Self::NetworkError)
    }
}

/// Classify a failed call.
///
/// `provider_code` is whatever machine-readable code the provider put in its
/// error envelope (Gemini `status`, OpenAI `code`/`type`).
pub fn classify(status: Option<u16>, provider_code: Option<&str>, message: &str) -> ErrorKind {
    if let Some(kind) = provider_code.and_then(classify_code) {
        return kind;
    }
    if let Some(kind) = status.and_then(classify_status) {
        return kind;
    }
    if let Some(kind) = classify_message(message) {
        return kind;
    }
    match status {
        Some(code) if (500..600).contains(&code) => ErrorKind::NetworkError,
        _ => ErrorKind::MalformedResponse,
    }
}

fn classify_code(code: &str) -> Option<ErrorKind> {
    let kind = match code.to_ascii_lowercase().as_str() {
        "resource_exhausted" | "rate_limit_exceeded" | "insufficient_quota" | "rate_limit" => {
            ErrorKind::QuotaExceeded
        }
        "not_found" | "model_not_found" | "model_decommissioned" | "model_not_available" => {
            ErrorKind::ModelUnavailable
        }
        "unauthenticated" | "permission_denied" | "invalid_api_key" | "api_key_invalid"
        | "authentication_error" => ErrorKind::AuthError,
        "deadline_exceeded" => ErrorKind::Timeout,
        "unavailable" | "internal" | "server_error" => ErrorKind::NetworkError,
        _ => return None,
    };
    Some(kind)
}

fn classify_status(status: u16) -> Option<ErrorKind> {
    let kind = match status {
        401 | 403 => ErrorKind::AuthError,
        404 => ErrorKind::ModelUnavailable,
        408 | 504 => ErrorKind::Timeout,
        429 => ErrorKind::QuotaExceeded,
        500..=599 => ErrorKind::NetworkError,
        _ => return None,
    };
    Some(kind)
}

/// Last-resort heuristic for providers that only hand back prose.
fn classify_message(message: &str) -> Option<ErrorKind> {
    let lower = message.to_ascii_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("429") || has("quota") || has("rate limit") || has("too many requests") {
        return Some(ErrorKind::QuotaExceeded);
    }
    if has("api key not valid") || has("invalid api key") || has("unauthorized") {
        return Some(ErrorKind::AuthError);
    }
    if has("404") || has("not found") || has("is not supported for") {
        return Some(ErrorKind::ModelUnavailable);
    }
    if has("timed out") || has("timeout") {
        return Some(ErrorKind::Timeout);
    }
    None
}

/// Parse a wait hint out of free text: "retry in 38s", "wait 60 seconds",
/// "Please try again in 7.5s", "45s before retry".
pub fn parse_retry_hint(text: &str) -> Option<Duration> {
    let lower = text.to_ascii_lowercase();
    for keyword in ["retry", "try again", "wait"] {
        let mut from = 0;
        while let Some(rel) = lower[from..].find(keyword) {
            let after = from + rel + keyword.len();
            if let Some(secs) = first_seconds_after(&lower[after..]) {
                return Some(secs);
            }
            from = after;
        }
    }
    // "(\d+)s ... retry" form: a seconds figure somewhere before the keyword.
    let retry_at = lower.find("retry")?;
    first_seconds_after(&lower[..retry_at])
}

/// Find the first `<number><unit>` where unit is s/sec/second(s), allowing
/// whitespace between number and unit.
fn first_seconds_after(text: &str) -> Option<Duration> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        let number = &text[start..i];
        let rest = text[i..].trim_start();
        if rest.starts_with('s')
            && let Ok(secs) = number.trim_end_matches('.').parse::<f64>()
            && let Ok(wait) = Duration::try_from_secs_f64(secs)
        {
            return Some(wait);
        }
    }
    None
}

/// Parse a protobuf-style duration string as used by Google APIs ("38s", "1.5s").
pub fn parse_proto_duration(value: &str) -> Option<Duration> {
    let secs = value.trim().strip_suffix('s')?.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Parse an HTTP `Retry-After` header carrying delta-seconds.
pub fn parse_retry_after_header(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_code_beats_status() {
        // Gemini reports a bad key as 400 INVALID_ARGUMENT with reason API_KEY_INVALID.
        assert_eq!(
            classify(Some(400), Some("API_KEY_INVALID"), "API key not valid"),
            ErrorKind::AuthError
        );
        assert_eq!(
            classify(Some(429), Some("RESOURCE_EXHAUSTED"), ""),
            ErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify(Some(404), Some("model_not_found"), ""),
            ErrorKind::ModelUnavailable
        );
    }

    #[test]
    fn status_codes_map_without_provider_code() {
        assert_eq!(classify(Some(401), None, ""), ErrorKind::AuthError);
        assert_eq!(classify(Some(403), None, ""), ErrorKind::AuthError);
        assert_eq!(classify(Some(404), None, ""), ErrorKind::ModelUnavailable);
        assert_eq!(classify(Some(429), None, ""), ErrorKind::QuotaExceeded);
        assert_eq!(classify(Some(408), None, ""), ErrorKind::Timeout);
        assert_eq!(classify(Some(503), None, ""), ErrorKind::NetworkError);
    }

    #[test]
    fn message_heuristics_are_last_resort() {
        assert_eq!(
            classify(None, None, "[429 Too Many Requests] Quota exceeded"),
            ErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify(None, None, "models/gemini-pro is not found for API version v1beta"),
            ErrorKind::ModelUnavailable
        );
        assert_eq!(
            classify(Some(400), None, "something odd"),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn unknown_provider_code_falls_through_to_status() {
        assert_eq!(
            classify(Some(429), Some("weird_code"), ""),
            ErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::QuotaExceeded.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::NetworkError.is_retryable());
        assert!(!ErrorKind::AuthError.is_retryable());
        assert!(!ErrorKind::ModelUnavailable.is_retryable());
        assert!(!ErrorKind::MalformedResponse.is_retryable());
    }

    #[test]
    fn retry_hint_forms() {
        assert_eq!(
            parse_retry_hint("Please retry in 38s."),
            Some(Duration::from_secs(38))
        );
        assert_eq!(
            parse_retry_hint("wait 60 seconds before sending more"),
            Some(Duration::from_secs(60))
        );
        assert_eq!(
            parse_retry_hint("Rate limit reached. Please try again in 7.5s."),
            Some(Duration::from_millis(7500))
        );
        assert_eq!(
            parse_retry_hint("come back in 45s then retry"),
            Some(Duration::from_secs(45))
        );
        assert_eq!(parse_retry_hint("quota exceeded"), None);
        assert_eq!(parse_retry_hint("retry later"), None);
    }

    #[test]
    fn retry_hint_ignores_non_second_units() {
        assert_eq!(parse_retry_hint("retry after 5 minutes"), None);
        assert_eq!(parse_retry_hint("retry in 200ms"), None);
    }

    #[test]
    fn proto_and_header_durations() {
        assert_eq!(parse_proto_duration("38s"), Some(Duration::from_secs(38)));
        assert_eq!(
            parse_proto_duration("1.5s"),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(parse_proto_duration("38"), None);
        assert_eq!(
            parse_retry_after_header(" 20 "),
            Some(Duration::from_secs(20))
        );
        assert_eq!(parse_retry_after_header("Wed, 21 Oct 2015"), None);
    }

    #[test]
    fn oversized_hints_are_dropped() {
        assert_eq!(parse_retry_hint("Please retry in 99999999999999999999999s."), None);
        assert_eq!(parse_proto_duration("1e300s"), None);
        assert_eq!(parse_proto_duration("-3s"), None);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::ModelUnavailable.to_string(), "model_unavailable");
        assert_eq!(ErrorKind::AuthError.as_ref(), "auth_error");
    }
}
