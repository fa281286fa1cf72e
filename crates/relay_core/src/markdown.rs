//! Telegram MarkdownV2 escaping.
//!
//! Every character in [`RESERVED`] has meaning in MarkdownV2 and must be
//! preceded by a backslash to appear literally. Telegram accepts the escaped
//! form anywhere, including inside link targets and inline code, so one
//! escaping routine covers every interpolated field.

#[cfg(test)]
#[path = "markdown_tests.rs"]
mod tests;

/// Characters that must be escaped in MarkdownV2 text.
pub const RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// Escapes `text` for literal display in a MarkdownV2 message.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes an optional field. Absent text renders as the empty string.
pub fn escape_optional(text: Option<&str>) -> String {
    text.map(escape_markdown).unwrap_or_default()
}

/// Renders a `[label](url)` link with both parts escaped.
pub fn link(label: &str, url: &str) -> String {
    format!("[{}]({})", escape_markdown(label), escape_markdown(url))
}

/// Renders an inline code span with its content escaped.
pub fn code(text: &str) -> String {
    format!("`{}`", escape_markdown(text))
}

/// Renders a bold `*label:* value` line. `value` must already be escaped.
pub fn labelled(label: &str, value: &str) -> String {
    format!("*{}:* {}", escape_markdown(label), value)
}
