//! Pure fragment normalization
//!
//! A fragment container is one generated code sample: line elements carrying
//! the actual source text, interleaved with decorative markup (anchors,
//! tooltips, fold widgets) that must not survive. The streaming layer in
//! [`crate::rewrite`] collects the line texts; everything here is a plain
//! string transform so the contract is testable without a document.

use crate::utils::{decode_entities, escape_angle_brackets};

/// Produce the normalized text for one fragment container.
///
/// Each entry in `lines` is the raw source text of one line element, entities
/// still encoded. Lines are decoded, joined with `\n` (the generator's
/// inter-line whitespace the browser rendition picked up implicitly), the
/// whole text is trimmed, and the two angle brackets are escaped.
///
/// A container with zero line elements yields an empty string, which becomes
/// an empty code block downstream; containers are never skipped.
pub fn normalize_lines(lines: &[String]) -> String {
    let decoded: Vec<String> = lines.iter().map(|line| decode_entities(line)).collect();
    let text = decoded.join("\n");
    escape_angle_brackets(text.trim())
}

/// Build the replacement markup for a fragment container.
///
/// The result is exactly one preformatted wrapper around one code element
/// whose class carries the configured language tag; `escaped` must already be
/// entity-escaped text from [`normalize_lines`].
pub fn replacement_markup(escaped: &str, lang_tag: &str) -> String {
    format!("<pre><code class=\"language-{lang_tag}\">{escaped}</code></pre>")
}
