//! Language tag detection and tree-sitter grammar loading

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use tree_sitter::Language;

/// Languages the highlighting pass ships a grammar for.
///
/// A code block can carry any `language-*` tag; only tags that resolve to one
/// of these gets highlighted, everything else is left as escaped plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    C,
    Cpp,
    Rust,
    Python,
    Go,
    Java,
    JavaScript,
    Bash,
}

/// Aliases accepted in `language-*` class tags, lowercased
static ALIASES: Lazy<HashMap<&'static str, Lang>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (alias, lang) in [
        ("c", Lang::C),
        ("h", Lang::C),
        ("cpp", Lang::Cpp),
        ("c++", Lang::Cpp),
        ("cxx", Lang::Cpp),
        ("cc", Lang::Cpp),
        ("hpp", Lang::Cpp),
        ("rust", Lang::Rust),
        ("rs", Lang::Rust),
        ("python", Lang::Python),
        ("py", Lang::Python),
        ("go", Lang::Go),
        ("golang", Lang::Go),
        ("java", Lang::Java),
        ("javascript", Lang::JavaScript),
        ("js", Lang::JavaScript),
        ("bash", Lang::Bash),
        ("sh", Lang::Bash),
        ("shell", Lang::Bash),
        ("zsh", Lang::Bash),
    ] {
        map.insert(alias, lang);
    }
    map
});

impl Lang {
    /// Resolve a `language-*` tag (or one of its aliases) to a language.
    ///
    /// Returns `None` for tags without a bundled grammar; the caller decides
    /// whether that means "skip" (it does, for the highlighting pass).
    pub fn from_tag(tag: &str) -> Option<Self> {
        ALIASES.get(tag.to_lowercase().as_str()).copied()
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::Bash => "bash",
        }
    }

    /// Get the tree-sitter Language for parsing
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Bash => tree_sitter_bash::LANGUAGE.into(),
        }
    }

    /// Get the highlight query source for the grammar.
    ///
    /// Upstream grammar crates are split on the constant name, hence the
    /// mixed singular/plural below. The C++ query inherits from C upstream,
    /// so the two are concatenated the way inherited query files are bundled.
    pub fn highlight_query(&self) -> Cow<'static, str> {
        match self {
            Self::C => Cow::Borrowed(tree_sitter_c::HIGHLIGHT_QUERY),
            Self::Cpp => Cow::Owned(format!(
                "{}\n{}",
                tree_sitter_c::HIGHLIGHT_QUERY,
                tree_sitter_cpp::HIGHLIGHT_QUERY
            )),
            Self::Rust => Cow::Borrowed(tree_sitter_rust::HIGHLIGHTS_QUERY),
            Self::Python => Cow::Borrowed(tree_sitter_python::HIGHLIGHTS_QUERY),
            Self::Go => Cow::Borrowed(tree_sitter_go::HIGHLIGHTS_QUERY),
            Self::Java => Cow::Borrowed(tree_sitter_java::HIGHLIGHTS_QUERY),
            Self::JavaScript => Cow::Borrowed(tree_sitter_javascript::HIGHLIGHT_QUERY),
            Self::Bash => Cow::Borrowed(tree_sitter_bash::HIGHLIGHT_QUERY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_detection() {
        assert_eq!(Lang::from_tag("cpp").unwrap(), Lang::Cpp);
        assert_eq!(Lang::from_tag("c++").unwrap(), Lang::Cpp);
        assert_eq!(Lang::from_tag("c").unwrap(), Lang::C);
        assert_eq!(Lang::from_tag("rust").unwrap(), Lang::Rust);
        assert_eq!(Lang::from_tag("rs").unwrap(), Lang::Rust);
        assert_eq!(Lang::from_tag("python").unwrap(), Lang::Python);
        assert_eq!(Lang::from_tag("golang").unwrap(), Lang::Go);
        assert_eq!(Lang::from_tag("js").unwrap(), Lang::JavaScript);
        assert_eq!(Lang::from_tag("sh").unwrap(), Lang::Bash);
    }

    #[test]
    fn test_tag_detection_is_case_insensitive() {
        assert_eq!(Lang::from_tag("CPP").unwrap(), Lang::Cpp);
        assert_eq!(Lang::from_tag("Rust").unwrap(), Lang::Rust);
    }

    #[test]
    fn test_unsupported_tag() {
        // The original pages tagged fragments as highlight.js "stan"
        assert!(Lang::from_tag("stan").is_none());
        assert!(Lang::from_tag("").is_none());
        assert!(Lang::from_tag("xyz").is_none());
    }

    #[test]
    fn test_grammar_and_query_load() {
        for lang in [
            Lang::C,
            Lang::Cpp,
            Lang::Rust,
            Lang::Python,
            Lang::Go,
            Lang::Java,
            Lang::JavaScript,
            Lang::Bash,
        ] {
            let _ = lang.tree_sitter_language();
            assert!(!lang.highlight_query().is_empty(), "{}", lang.name());
        }
    }
}
