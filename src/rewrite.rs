//! Per-document streaming transform
//!
//! One documentation page goes through up to four streaming passes:
//!
//! 1. collect the line texts of every fragment container
//! 2. rewrite each container to one `<pre><code class="language-*">` block
//! 3. collect every `code.language-*` block's text (the whole document, not
//!    just freshly normalized fragments)
//! 4. rewrite highlightable blocks with span markup
//!
//! Passes 3 and 4 run strictly after 1 and 2, preserving the contract that
//! the highlighting pass sees the final inserted markup. Streaming rewrites
//! cannot read an element's content and replace it in the same pass, hence
//! the collect/rewrite pairing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use tracing::debug;

use crate::error::{FraglightError, Result};
use crate::fragment::{normalize_lines, replacement_markup};
use crate::highlight::Highlighter;
use crate::lang::Lang;
use crate::utils::{decode_entities, truncate_with_ellipsis};

/// Per-document transform configuration
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Language tag written on normalized fragments (`class="language-TAG"`)
    pub lang_tag: String,
    /// CSS class marking a code fragment container
    pub fragment_class: String,
    /// CSS class marking one source line inside a container
    pub line_class: String,
    /// Whether to run the highlighting pass
    pub highlight: bool,
}

impl DocumentOptions {
    /// Build options, validating that the class names and language tag are
    /// usable inside selectors and class attributes.
    pub fn new(
        lang_tag: &str,
        fragment_class: &str,
        line_class: &str,
        highlight: bool,
    ) -> Result<Self> {
        for name in [fragment_class, line_class] {
            if !is_valid_class_name(name) {
                return Err(FraglightError::InvalidClassName {
                    name: name.to_string(),
                });
            }
        }
        if lang_tag.is_empty() || !lang_tag.chars().all(is_tag_char) {
            return Err(FraglightError::InvalidLanguageTag {
                tag: lang_tag.to_string(),
            });
        }
        Ok(Self {
            lang_tag: lang_tag.to_string(),
            fragment_class: fragment_class.to_string(),
            line_class: line_class.to_string(),
            highlight,
        })
    }
}

impl Default for DocumentOptions {
    /// Doxygen's markup: `div.fragment` containers with `div.line` children
    fn default() -> Self {
        Self {
            lang_tag: "cpp".to_string(),
            fragment_class: "fragment".to_string(),
            line_class: "line".to_string(),
            highlight: true,
        }
    }
}

fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.')
}

/// Counters from transforming one document
#[derive(Debug, Default)]
pub struct TransformResult {
    /// Fragment containers rewritten to normalized code blocks
    pub fragments_normalized: usize,
    /// Code blocks rewritten with highlight markup
    pub blocks_highlighted: usize,
    /// Code blocks whose language tag has no bundled grammar
    pub blocks_skipped: usize,
    /// Distinct language tags that could not be highlighted
    pub unsupported_languages: Vec<String>,
}

/// Normalize every fragment container in `html` and run the highlighting
/// pass, returning the transformed document and counters.
///
/// Containers are independent of each other; a page with zero containers
/// still goes through the highlighting pass so pre-existing
/// `code.language-*` blocks get colorized, mirroring a whole-document
/// highlighter invocation.
pub fn normalize_document(
    html: &str,
    options: &DocumentOptions,
    highlighter: &mut Highlighter,
) -> Result<(String, TransformResult)> {
    let mut result = TransformResult::default();

    // Fast path: nothing to normalize and nothing to highlight
    let has_fragments = html.contains(&options.fragment_class);
    if !has_fragments && !html.contains("language-") {
        return Ok((html.to_string(), result));
    }

    let normalized = if has_fragments {
        let line_groups = collect_fragments(html, options)?;
        if line_groups.is_empty() {
            html.to_string()
        } else {
            result.fragments_normalized = line_groups.len();
            rewrite_fragments(html, options, &line_groups)?
        }
    } else {
        html.to_string()
    };

    if !options.highlight || !normalized.contains("language-") {
        return Ok((normalized, result));
    }

    let highlighted = highlight_document(&normalized, highlighter, &mut result)?;
    Ok((highlighted, result))
}

// ============================================================================
// Fragment passes
// ============================================================================

/// Pass 1: collect the line texts of every fragment container, in document
/// order. Each inner vector holds the raw (entity-encoded) text of one line
/// element's subtree; direct text and non-line children of the container are
/// excluded.
fn collect_fragments(html: &str, options: &DocumentOptions) -> Result<Vec<Vec<String>>> {
    let fragment_sel = format!(".{}", options.fragment_class);
    let line_sel = format!(".{} > .{}", options.fragment_class, options.line_class);

    let fragments: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));

    let open_fragment = fragments.clone();
    let open_line = fragments.clone();
    let line_text = fragments.clone();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(fragment_sel, move |_el| {
                    open_fragment.borrow_mut().push(Vec::new());
                    Ok(())
                }),
                element!(line_sel.clone(), move |_el| {
                    if let Some(fragment) = open_line.borrow_mut().last_mut() {
                        fragment.push(String::new());
                    }
                    Ok(())
                }),
                text!(line_sel, move |chunk| {
                    let mut fragments = line_text.borrow_mut();
                    if let Some(line) = fragments.last_mut().and_then(|f| f.last_mut()) {
                        line.push_str(chunk.as_str());
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FraglightError::RewriteFailure {
        message: e.to_string(),
    })?;

    Ok(Rc::try_unwrap(fragments)
        .map(|cell| cell.into_inner())
        .unwrap_or_default())
}

/// Pass 2: replace each container's entire content with one preformatted
/// code block built from the collected lines.
fn rewrite_fragments(
    html: &str,
    options: &DocumentOptions,
    line_groups: &[Vec<String>],
) -> Result<String> {
    let fragment_sel = format!(".{}", options.fragment_class);

    let replacements: Vec<String> = line_groups
        .iter()
        .map(|lines| {
            let normalized = normalize_lines(lines);
            debug!(
                lines = lines.len(),
                text = %truncate_with_ellipsis(&normalized, 60),
                "normalized fragment"
            );
            replacement_markup(&normalized, &options.lang_tag)
        })
        .collect();

    // Containers do not nest in generator output; a nested container would be
    // consumed by its parent's replacement and leave trailing entries unused.
    let index = Rc::new(Cell::new(0usize));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(fragment_sel, move |el| {
                let i = index.get();
                if let Some(markup) = replacements.get(i) {
                    el.set_inner_content(markup, ContentType::Html);
                }
                index.set(i + 1);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FraglightError::RewriteFailure {
        message: e.to_string(),
    })
}

// ============================================================================
// Highlighting passes
// ============================================================================

/// One code block pending highlighting
#[derive(Debug)]
struct PendingBlock {
    tag: String,
    text: String,
}

/// Extract the `language-*` token from a class attribute value.
fn language_tag(class: &str) -> Option<&str> {
    class
        .split_ascii_whitespace()
        .find_map(|token| token.strip_prefix("language-"))
        .filter(|tag| !tag.is_empty())
}

/// Passes 3 and 4: highlight every `code` element carrying a `language-*`
/// class. Blocks with no bundled grammar are left untouched and counted.
fn highlight_document(
    html: &str,
    highlighter: &mut Highlighter,
    result: &mut TransformResult,
) -> Result<String> {
    // Pass 3: collect (tag, text) for every language-tagged code element
    let blocks: Rc<RefCell<Vec<PendingBlock>>> = Rc::new(RefCell::new(Vec::new()));
    let in_block = Rc::new(Cell::new(false));

    {
        let open_blocks = blocks.clone();
        let open_flag = in_block.clone();
        let text_blocks = blocks.clone();
        let text_flag = in_block.clone();

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("code", move |el| {
                        let class = el.get_attribute("class");
                        match class.as_deref().and_then(language_tag) {
                            Some(tag) => {
                                open_blocks.borrow_mut().push(PendingBlock {
                                    tag: tag.to_string(),
                                    text: String::new(),
                                });
                                open_flag.set(true);
                            }
                            None => open_flag.set(false),
                        }
                        Ok(())
                    }),
                    text!("code", move |chunk| {
                        if text_flag.get() {
                            if let Some(block) = text_blocks.borrow_mut().last_mut() {
                                block.text.push_str(chunk.as_str());
                            }
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| FraglightError::RewriteFailure {
            message: e.to_string(),
        })?;
    }

    let blocks = Rc::try_unwrap(blocks)
        .map(|cell| cell.into_inner())
        .unwrap_or_default();

    if blocks.is_empty() {
        return Ok(html.to_string());
    }

    // Highlight each block; None means "leave as-is"
    let mut rendered: Vec<Option<String>> = Vec::with_capacity(blocks.len());
    for block in &blocks {
        match Lang::from_tag(&block.tag) {
            Some(lang) => {
                let source = decode_entities(&block.text);
                let markup = highlighter.highlight(lang, &source)?;
                result.blocks_highlighted += 1;
                rendered.push(Some(markup));
            }
            None => {
                result.blocks_skipped += 1;
                if !result.unsupported_languages.contains(&block.tag) {
                    result.unsupported_languages.push(block.tag.clone());
                }
                debug!(tag = %block.tag, "no grammar for language tag, leaving block as-is");
                rendered.push(None);
            }
        }
    }

    // Pass 4: replace the content of blocks that were highlighted
    let index = Rc::new(Cell::new(0usize));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("code", move |el| {
                let class = el.get_attribute("class");
                if class.as_deref().and_then(language_tag).is_some() {
                    let i = index.get();
                    if let Some(Some(markup)) = rendered.get(i) {
                        el.set_inner_content(markup, ContentType::Html);
                    }
                    index.set(i + 1);
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| FraglightError::RewriteFailure {
        message: e.to_string(),
    })
}
