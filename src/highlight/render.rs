//! HTML rendering of highlight spans
//!
//! Raw query captures arrive as byte ranges with capture names. Rendering
//! maps each capture to a small set of CSS classes, drops duplicates covering
//! the same range (later query patterns win, the tree-sitter convention),
//! merges adjacent spans with the same class, and emits
//! `<span class="hl-*">` wrappers with fully escaped text.

use std::collections::HashMap;

/// One highlight capture over the code block's source text
#[derive(Debug, Clone)]
pub struct Span {
    /// Byte offset where the span starts (inclusive)
    pub start: u32,
    /// Byte offset where the span ends (exclusive)
    pub end: u32,
    /// Capture name from the highlight query, e.g. `keyword.function`
    pub capture: String,
    /// Index of the query pattern that produced the capture
    pub pattern_index: usize,
}

/// Prefix for emitted CSS classes
const CLASS_PREFIX: &str = "hl";

/// Map a capture name to the CSS class it renders as.
///
/// Only the first dot segment matters; captures with no visual class
/// (`spell`, locals tracking, internals) return `None` and are dropped.
fn class_for_capture(capture: &str) -> Option<&'static str> {
    let base = capture.split('.').next().unwrap_or(capture);
    match base {
        "keyword" | "include" | "conditional" | "repeat" | "exception" | "storageclass" => {
            Some("keyword")
        }
        "function" | "method" => Some("function"),
        "string" | "character" => Some("string"),
        "comment" => Some("comment"),
        "type" => Some("type"),
        "variable" | "parameter" => Some("variable"),
        "constant" | "boolean" => Some("constant"),
        "number" | "float" => Some("number"),
        "operator" => Some("operator"),
        "punctuation" | "delimiter" => Some("punctuation"),
        "property" | "field" => Some("property"),
        "attribute" => Some("attribute"),
        "label" => Some("label"),
        "namespace" | "module" => Some("namespace"),
        "constructor" => Some("constructor"),
        "tag" => Some("tag"),
        "escape" => Some("escape"),
        "embedded" => Some("embedded"),
        _ => None,
    }
}

/// A span normalized to its CSS class
#[derive(Debug, Clone)]
struct ClassedSpan {
    start: u32,
    end: u32,
    class: &'static str,
}

/// Drop unstyled captures, resolve same-range duplicates, and merge adjacent
/// spans that share a class.
fn normalize_and_coalesce(spans: Vec<Span>) -> Vec<ClassedSpan> {
    let mut spans = spans;
    // Zero-width captures (MISSING nodes from error recovery) render nothing
    // and would desync the event stack
    spans.retain(|s| s.start < s.end);
    if spans.is_empty() {
        return vec![];
    }

    // Same (start, end): higher pattern_index wins, styled beats unstyled
    let mut deduped: HashMap<(u32, u32), Span> = HashMap::new();
    for span in spans {
        let key = (span.start, span.end);
        let new_styled = class_for_capture(&span.capture).is_some();

        if let Some(existing) = deduped.get(&key) {
            let existing_styled = class_for_capture(&existing.capture).is_some();
            let should_replace = match (new_styled, existing_styled) {
                (true, false) => true,
                (false, true) => false,
                _ => span.pattern_index >= existing.pattern_index,
            };
            if should_replace {
                deduped.insert(key, span);
            }
        } else {
            deduped.insert(key, span);
        }
    }

    let mut classed: Vec<ClassedSpan> = deduped
        .into_values()
        .filter_map(|span| {
            class_for_capture(&span.capture).map(|class| ClassedSpan {
                start: span.start,
                end: span.end,
                class,
            })
        })
        .collect();

    // Longer spans first at the same start, so an inner span opens after its
    // enclosing span and sits on top of the render stack
    classed.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut coalesced: Vec<ClassedSpan> = Vec::with_capacity(classed.len());
    for span in classed {
        if let Some(last) = coalesced.last_mut() {
            if span.class == last.class && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        }
        coalesced.push(span);
    }

    coalesced
}

/// Render spans over `source` as HTML.
///
/// Overlapping (nested) spans are handled with an event stack: at any point
/// the innermost open span's class wraps the text. Text outside every span is
/// emitted escaped but unwrapped.
pub fn spans_to_html(source: &str, spans: Vec<Span>) -> String {
    let spans = normalize_and_coalesce(spans);
    if spans.is_empty() {
        return html_escape(source);
    }

    // (pos, is_start, span index); ends sort before starts at the same pos
    let mut events: Vec<(u32, bool, usize)> = Vec::with_capacity(spans.len() * 2);
    for (i, span) in spans.iter().enumerate() {
        events.push((span.start, true, i));
        events.push((span.end, false, i));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut html = String::with_capacity(source.len() * 2);
    let mut last_pos: usize = 0;
    let mut stack: Vec<usize> = Vec::new();

    for (pos, is_start, span_idx) in events {
        let pos = (pos as usize).min(source.len());

        if pos > last_pos {
            emit_text(
                &mut html,
                &source[last_pos..pos],
                stack.last().map(|&i| spans[i].class),
            );
            last_pos = pos;
        }

        if is_start {
            stack.push(span_idx);
        } else if let Some(idx) = stack.iter().rposition(|&x| x == span_idx) {
            stack.remove(idx);
        }
    }

    if last_pos < source.len() {
        emit_text(
            &mut html,
            &source[last_pos..],
            stack.last().map(|&i| spans[i].class),
        );
    }

    html
}

fn emit_text(html: &mut String, text: &str, class: Option<&'static str>) {
    match class {
        Some(class) => {
            html.push_str(&format!("<span class=\"{CLASS_PREFIX}-{class}\">"));
            html.push_str(&html_escape(text));
            html.push_str("</span>");
        }
        None => html.push_str(&html_escape(text)),
    }
}

/// Escape HTML special characters.
///
/// Unlike the fragment transform's angle-bracket escape, highlighted output
/// is fully escaped since it is emitted as fresh markup.
pub fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
