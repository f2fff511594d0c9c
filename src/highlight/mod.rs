//! Tree-sitter based highlighting pass
//!
//! The browser original handed the finished page to highlight.js; here the
//! pass parses each code block with the grammar matching its `language-*`
//! tag and rewrites the block's content as `<span class="hl-*">` markup.

pub mod render;

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use crate::error::{FraglightError, Result};
use crate::lang::Lang;
use render::Span;

pub use render::{html_escape, spans_to_html};

/// A compiled grammar: parser with the language set plus its highlight query
struct Grammar {
    parser: Parser,
    query: Query,
}

impl Grammar {
    fn new(lang: Lang) -> Result<Self> {
        let language = lang.tree_sitter_language();

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| FraglightError::ParseFailure {
                message: format!("Failed to set language {}: {:?}", lang.name(), e),
            })?;

        let query_source = lang.highlight_query();
        let query =
            Query::new(&language, &query_source).map_err(|e| {
                FraglightError::QueryFailure {
                    message: format!("{} highlight query: {}", lang.name(), e),
                }
            })?;

        Ok(Self { parser, query })
    }
}

/// Highlighter with per-language grammar caching.
///
/// Compiling a highlight query is the expensive part, so one `Highlighter`
/// is meant to live for many code blocks (the processor keeps one per rayon
/// worker thread).
pub struct Highlighter {
    grammars: HashMap<Lang, Grammar>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            grammars: HashMap::new(),
        }
    }

    /// Highlight one code block's source text, returning HTML markup.
    pub fn highlight(&mut self, lang: Lang, source: &str) -> Result<String> {
        let grammar = self.grammar_for(lang)?;

        let tree = grammar
            .parser
            .parse(source, None)
            .ok_or_else(|| FraglightError::ParseFailure {
                message: format!("Failed to parse {} code block", lang.name()),
            })?;

        let spans = collect_spans(&grammar.query, tree.root_node(), source);
        Ok(spans_to_html(source, spans))
    }

    fn grammar_for(&mut self, lang: Lang) -> Result<&mut Grammar> {
        use std::collections::hash_map::Entry;
        match self.grammars.entry(lang) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Grammar::new(lang)?)),
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the highlight query over a parsed tree and collect raw spans.
fn collect_spans(query: &Query, root: Node<'_>, source: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source.as_bytes());

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let capture_name = query.capture_names()[capture.index as usize];

            // Internal and injection captures carry no styling
            if capture_name.starts_with('_') || capture_name.starts_with("injection.") {
                continue;
            }

            // MISSING nodes inserted by error recovery are zero width
            if capture.node.start_byte() >= capture.node.end_byte() {
                continue;
            }

            spans.push(Span {
                start: capture.node.start_byte() as u32,
                end: capture.node.end_byte() as u32,
                capture: capture_name.to_string(),
                pattern_index: m.pattern_index,
            });
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_cpp_keywords() {
        let mut highlighter = Highlighter::new();
        let html = highlighter
            .highlight(Lang::Cpp, "if (a < b) { return; }")
            .unwrap();

        assert!(html.contains("hl-keyword"), "got: {}", html);
        assert!(html.contains("&lt;"), "got: {}", html);
        assert!(!html.contains(" < "), "got: {}", html);
    }

    #[test]
    fn test_highlight_rust_fn() {
        let mut highlighter = Highlighter::new();
        let html = highlighter
            .highlight(Lang::Rust, "fn main() {}")
            .unwrap();

        assert!(html.contains("hl-"), "got: {}", html);
        assert!(html.contains("main"), "got: {}", html);
    }

    #[test]
    fn test_highlight_empty_source() {
        let mut highlighter = Highlighter::new();
        let html = highlighter.highlight(Lang::Cpp, "").unwrap();
        assert_eq!(html, "");
    }

    #[test]
    fn test_grammar_cache_reuse() {
        let mut highlighter = Highlighter::new();
        highlighter.highlight(Lang::Cpp, "int x;").unwrap();
        highlighter.highlight(Lang::Cpp, "int y;").unwrap();
        assert_eq!(highlighter.grammars.len(), 1);

        highlighter.highlight(Lang::Python, "x = 1").unwrap();
        assert_eq!(highlighter.grammars.len(), 2);
    }

    #[test]
    fn test_all_bundled_grammars_compile() {
        let mut highlighter = Highlighter::new();
        for (lang, snippet) in [
            (Lang::C, "int main(void) { return 0; }"),
            (Lang::Cpp, "auto x = std::min(a, b);"),
            (Lang::Rust, "let x: u32 = 1;"),
            (Lang::Python, "def f():\n    pass"),
            (Lang::Go, "func main() {}"),
            (Lang::Java, "class A {}"),
            (Lang::JavaScript, "const x = () => 1;"),
            (Lang::Bash, "echo hi"),
        ] {
            let html = highlighter.highlight(lang, snippet);
            assert!(html.is_ok(), "{} failed: {:?}", lang.name(), html.err());
        }
    }
}
