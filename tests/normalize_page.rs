//! End-to-end page normalization tests
//!
//! Exercises the documented contract of the per-document transform against
//! synthetic generator output: fragment cleanup, escaping, the
//! highlight-after-normalize ordering, and the known edge cases (zero
//! containers, zero line children, unsupported language tags).

use fraglight::{normalize_document, DocumentOptions, Highlighter};

fn run(html: &str, options: &DocumentOptions) -> (String, fraglight::TransformResult) {
    let mut highlighter = Highlighter::new();
    normalize_document(html, options, &mut highlighter).unwrap()
}

fn no_highlight() -> DocumentOptions {
    DocumentOptions::new("cpp", "fragment", "line", false).unwrap()
}

/// A realistic page body in the shape Doxygen emits: anchors and tooltip
/// divs interleaved with line divs, keywords wrapped in spans.
fn doxygen_page() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head><title>repairschedule.cpp</title></head>
<body>
<div class="contents">
<div class="fragment">
<a id="l00012" class="anchor"></a>
<div class="line"><span class="keywordtype">int</span> repair(Schedule &amp;s) {</div>
<div class="line">  <span class="keywordflow">if</span> (s.cost() &lt; 0) { <span class="keywordflow">return</span> -1; }</div>
<div class="line">}</div>
<div class="ttc" id="aschedule"><div class="ttname">Schedule</div></div>
</div>
</div>
</body>
</html>"#
}

#[test]
fn container_is_reduced_to_one_pre_code_block() {
    let (out, stats) = run(doxygen_page(), &no_highlight());

    assert_eq!(stats.fragments_normalized, 1);
    assert_eq!(out.matches("<pre>").count(), 1);
    assert_eq!(out.matches("<code").count(), 1);
    // Decorative children are gone
    assert!(!out.contains("anchor"));
    assert!(!out.contains("ttname"));
    // Page chrome outside the fragment is untouched
    assert!(out.contains("<title>repairschedule.cpp</title>"));
}

#[test]
fn line_text_is_kept_and_angle_brackets_escaped() {
    let (out, _) = run(doxygen_page(), &no_highlight());

    // The &lt; from the generator survives as &lt;, the &amp; decodes to a
    // bare ampersand (only angle brackets are escaped)
    assert!(out.contains("(s.cost() &lt; 0)"), "got: {}", out);
    assert!(out.contains("Schedule &s)"), "got: {}", out);
}

#[test]
fn escaped_comparison_example_from_contract() {
    let html = r#"<div class="fragment"><div class="line">if (a &lt; b) { return; }</div></div>"#;
    let (out, _) = run(html, &no_highlight());

    assert!(
        out.contains(r#"<code class="language-cpp">if (a &lt; b) { return; }</code>"#),
        "got: {}",
        out
    );
}

#[test]
fn normalized_text_has_no_leading_or_trailing_whitespace() {
    let html = "<div class=\"fragment\"><div class=\"line\">   </div><div class=\"line\">  x();</div><div class=\"line\"></div></div>";
    let (out, _) = run(html, &no_highlight());

    assert!(out.contains(r#"<code class="language-cpp">x();</code>"#), "got: {}", out);
}

#[test]
fn zero_containers_leaves_document_unchanged() {
    let html = "<html><body><h1>Classes</h1><p>index page</p></body></html>";
    let (out, stats) = run(html, &DocumentOptions::default());

    assert_eq!(out, html);
    assert_eq!(stats.fragments_normalized, 0);
    assert_eq!(stats.blocks_highlighted, 0);
}

#[test]
fn highlight_pass_covers_preexisting_blocks() {
    // The highlighting pass scans the whole document, so a language-tagged
    // block that was never a fragment still gets highlighted
    let html = r#"<body><pre><code class="language-python">def f():
    return 1</code></pre></body>"#;
    let (out, stats) = run(html, &DocumentOptions::default());

    assert_eq!(stats.fragments_normalized, 0);
    assert_eq!(stats.blocks_highlighted, 1);
    assert!(out.contains("hl-keyword"), "got: {}", out);
}

#[test]
fn highlight_runs_after_all_containers_are_normalized() {
    let (out, stats) = run(doxygen_page(), &DocumentOptions::default());

    assert_eq!(stats.fragments_normalized, 1);
    assert_eq!(stats.blocks_highlighted, 1);
    // The highlighted markup lives inside the normalized block
    assert!(out.contains(r#"<code class="language-cpp">"#), "got: {}", out);
    assert!(out.contains("hl-keyword"), "got: {}", out);
    // Escaping is preserved through highlighting
    assert!(out.contains("&lt;"), "got: {}", out);
}

#[test]
fn container_without_line_children_becomes_empty_block() {
    let html = r#"<div class="fragment"><a class="anchor"></a><div class="ttc">tip</div></div>"#;
    let (out, stats) = run(html, &DocumentOptions::default());

    assert_eq!(stats.fragments_normalized, 1);
    assert!(
        out.contains(r#"<pre><code class="language-cpp"></code></pre>"#),
        "got: {}",
        out
    );
}

#[test]
fn unsupported_language_tag_is_skipped_not_fatal() {
    let html = r#"<div class="fragment"><div class="line">y ~ normal(0, 1);</div></div>"#;
    let options = DocumentOptions::new("stan", "fragment", "line", true).unwrap();
    let (out, stats) = run(html, &options);

    assert_eq!(stats.fragments_normalized, 1);
    assert_eq!(stats.blocks_highlighted, 0);
    assert_eq!(stats.blocks_skipped, 1);
    assert_eq!(stats.unsupported_languages, vec!["stan".to_string()]);
    assert!(
        out.contains(r#"<code class="language-stan">y ~ normal(0, 1);</code>"#),
        "got: {}",
        out
    );
}

#[test]
fn containers_are_independent() {
    let html = r#"
<div class="fragment"><div class="line">first();</div></div>
<div class="fragment"><span class="junk">x</span></div>
<div class="fragment"><div class="line">third(a &gt; b);</div></div>
"#;
    let (out, stats) = run(html, &no_highlight());

    assert_eq!(stats.fragments_normalized, 3);
    assert!(out.contains("first();"));
    assert!(out.contains(r#"<code class="language-cpp"></code>"#));
    assert!(out.contains("third(a &gt; b);"));
}
