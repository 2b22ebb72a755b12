//! Prompt templates and excerpt truncation.

use articlechat_shared::TaskKind;

/// Category returned for a blank excerpt without calling the model.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Summary returned for a blank excerpt without calling the model.
pub const NO_SUMMARY: &str = "No content available to summarize.";

/// Category recorded for an article whose classification failed in a batch.
pub const ERROR_CATEGORY: &str = "Error";

/// Header placed in front of every answer.
pub const RESPONSE_HEADER: &str = "### Response:\n\n";

/// Marker appended after the excerpt in interact prompts.
const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `text`. Never splits a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Excerpt as it will appear in the prompt for `kind`.
pub fn excerpt_for(kind: TaskKind, excerpt: &str) -> &str {
    truncate_chars(excerpt, kind.max_excerpt_chars())
}

/// Build the single-turn prompt for `kind`.
///
/// `question` is only read for [`TaskKind::Interact`]; validation happens in
/// the pipeline before this is called.
pub fn build_prompt(kind: TaskKind, excerpt: &str, question: &str) -> String {
    let excerpt = excerpt_for(kind, excerpt);
    match kind {
        TaskKind::Interact => format!(
            "Based on the following article content:\n\n{excerpt}{ELLIPSIS}\n\n\
             Answer this question professionally with a structured format: {question}"
        ),
        TaskKind::Classify => format!(
            "Classify the following article into a category such as Sports, Technology, \
             Food, etc., based on its content:\n\n{excerpt}\n\nCategory:"
        ),
        TaskKind::Summarize => format!(
            "Summarize the following article content in 50 to 100 words:\n\n{excerpt}"
        ),
        TaskKind::Enhance => format!(
            "Rewrite the following text to be more professional, engaging, \
             and polished:\n\n{excerpt}"
        ),
    }
}

/// Shape the model's raw completion into the text returned to callers.
pub fn format_reply(kind: TaskKind, completion: &str) -> String {
    let trimmed = completion.trim();
    match kind {
        TaskKind::Interact => format!("{RESPONSE_HEADER}{trimmed}"),
        _ => trimmed.to_string(),
    }
}
