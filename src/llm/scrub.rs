use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 300;
const REDACTED: &str = "[REDACTED]";
/// Shortest prefixed token treated as a key.
const MIN_PREFIXED_KEY_CHARS: usize = 12;

/// Key prefixes issued by the providers we talk to (Gemini, OpenAI, Groq)
/// plus bearer-style tokens that show up echoed in error bodies.
const KEY_PREFIXES: [&str; 5] = ["AIza", "sk-", "gsk_", "ya29.", "eyJ"];

/// Markers after which the next token is a credential.
const VALUE_MARKERS: [&str; 8] = [
    "Bearer ",
    "bearer ",
    "key=",
    "api_key=",
    "x-goog-api-key: ",
    "\"api_key\":\"",
    "\"apiKey\":\"",
    "\"token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|&(_, c)| !is_secret_char(c))
        .map_or(input.len(), |(i, _)| from + i)
}

/// Replace the token following every occurrence of `marker`.
///
/// With `keep_marker` the marker text survives (`key=[REDACTED]`); otherwise
/// the marker is part of the secret (`AIza...` becomes `[REDACTED]`).
fn redact_after(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let end = token_end(scrubbed, value_start);

        if end == value_start {
            search_from = value_start;
            continue;
        }
        if !keep_marker {
            let starts_token = scrubbed[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !is_secret_char(c));
            if !starts_token || end - start < MIN_PREFIXED_KEY_CHARS {
                search_from = value_start;
                continue;
            }
        }

        let replace_from = if keep_marker { value_start } else { start };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Scrub credential-looking tokens from provider error text before it is
/// logged or returned in diagnostics. Prefixed keys only match as whole
/// tokens of at least `MIN_PREFIXED_KEY_CHARS`.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_work = KEY_PREFIXES
        .iter()
        .chain(VALUE_MARKERS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_work {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in VALUE_MARKERS {
        redact_after(&mut scrubbed, marker, true);
    }
    for prefix in KEY_PREFIXES {
        redact_after(&mut scrubbed, prefix, false);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and truncate to a log-friendly length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);
    format!("{}...", &scrubbed[..end])
}
