use crate::error::LlmError;
use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Prefixes of raw credentials that may be echoed back by an API.
const KEY_PREFIXES: [&str; 2] = ["AIza", "ya29."];

/// Markers after which the next token is a credential.
const KEY_MARKERS: [&str; 6] = [
    "key=",
    "api_key=",
    "access_token=",
    "Authorization: Bearer ",
    "\"api_key\":\"",
    "\"access_token\":\"",
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

/// Replace the token that follows every occurrence of `marker`.
///
/// When `keep_marker` is false the marker itself is part of the secret
/// (a key prefix) and is replaced too.
fn redact_after(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        if end == content_start {
            search_from = content_start;
            continue;
        }

        let replace_from = if keep_marker { content_start } else { start };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Scrub API keys and bearer tokens out of text that is about to be logged
/// or surfaced to the user.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = KEY_PREFIXES
        .iter()
        .chain(KEY_MARKERS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in KEY_MARKERS {
        redact_after(&mut scrubbed, marker, true);
    }
    for prefix in KEY_PREFIXES {
        redact_after(&mut scrubbed, prefix, false);
    }
    Cow::Owned(scrubbed)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    LlmError::Request {
        provider: provider.to_string(),
        message: format!("API error ({status}): {sanitized}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_clean_text_borrowed() {
        let text = "quota exceeded for project";
        assert!(matches!(scrub_secret_patterns(text), Cow::Borrowed(_)));
    }

    #[test]
    fn redacts_query_key() {
        let text = "POST /v1beta/models/x:generateContent?key=abc123XYZ failed";
        let scrubbed = scrub_secret_patterns(text);
        assert!(!scrubbed.contains("abc123XYZ"));
        assert!(scrubbed.contains("key=[REDACTED] failed"));
    }

    #[test]
    fn redacts_google_api_key_prefix() {
        let text = "API key AIzaSyD-example_Key not valid";
        let scrubbed = scrub_secret_patterns(text);
        assert!(!scrubbed.contains("AIzaSyD"));
        assert!(scrubbed.contains("API key [REDACTED] not valid"));
    }

    #[test]
    fn bare_marker_is_left_alone() {
        let text = "missing key= parameter";
        assert_eq!(scrub_secret_patterns(text), "missing key= parameter");
    }

    #[test]
    fn sanitize_truncates_on_char_boundary() {
        let long = "오류".repeat(150);
        let sanitized = sanitize_api_error(&long);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), MAX_API_ERROR_CHARS + 3);
    }
}
