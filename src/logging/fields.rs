//! Field helpers for structured log events

/// Longest prompt excerpt written to logs, in characters.
const PROMPT_EXCERPT_CHARS: usize = 100;

/// Prompt excerpt for logging, or `None` unless content logging is enabled.
///
/// Truncates on a character boundary and appends `...` when shortened.
pub fn truncate_prompt(prompt: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging || prompt.is_empty() {
        return None;
    }

    Some(truncate_string(prompt, PROMPT_EXCERPT_CHARS))
}

fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
