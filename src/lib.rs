//! fraglight: documentation code-fragment normalizer with syntax highlighting
//!
//! Documentation generators emit code samples as fragment containers full of
//! decorative markup (anchors, line numbers, tooltip helpers) wrapped around
//! line elements holding the actual source text. This crate rewrites each
//! container into a single clean `<pre><code class="language-*">` block —
//! keeping only the line text, trimmed and angle-bracket escaped — and then
//! runs a tree-sitter highlighting pass over every language-tagged code
//! block in the page.
//!
//! # Example
//!
//! ```ignore
//! use fraglight::{normalize_document, DocumentOptions, Highlighter};
//!
//! let page = r#"<div class="fragment"><div class="line">if (a &lt; b) { return; }</div></div>"#;
//! let mut highlighter = Highlighter::new();
//! let (out, stats) = normalize_document(page, &DocumentOptions::default(), &mut highlighter)?;
//! assert!(out.contains(r#"<pre><code class="language-cpp">"#));
//! assert_eq!(stats.fragments_normalized, 1);
//! ```

pub mod cli;
pub mod error;
pub mod fragment;
pub mod highlight;
pub mod lang;
pub mod processor;
pub mod rewrite;
pub mod utils;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use error::{FraglightError, Result};
pub use fragment::{normalize_lines, replacement_markup};
pub use highlight::Highlighter;
pub use lang::Lang;
pub use processor::{ProcessOptions, ProcessStats, Processor};
pub use rewrite::{normalize_document, DocumentOptions, TransformResult};
