//! Code block highlighting
//!
//! A [`Highlighter`] maps language tags to [`LanguageHighlighter`] strategies.
//! Unknown or missing tags, and any strategy failure, fall back to plain
//! escaped text so highlighting can never break rendering.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;

/// Default prefix for token class names
pub const DEFAULT_CLASS_PREFIX: &str = "hljs-";

/// A run of code text with an optional token class (without prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub class: Option<String>,
    pub text: String,
}

impl HighlightSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            class: None,
            text: text.into(),
        }
    }

    pub fn classed(class: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            text: text.into(),
        }
    }
}

/// Result of highlighting a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightedCode {
    Highlighted(Vec<HighlightSpan>),
    Plain(String),
}

impl HighlightedCode {
    /// The source text with all spans joined
    pub fn source(&self) -> String {
        match self {
            HighlightedCode::Highlighted(spans) => spans.iter().map(|s| s.text.as_str()).collect(),
            HighlightedCode::Plain(text) => text.clone(),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, HighlightedCode::Highlighted(_))
    }
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("Failed to tokenize code: {0}")]
    Tokenize(String),

    #[error("Highlighter panicked")]
    Panicked,
}

/// Highlighting strategy for one or more languages
pub trait LanguageHighlighter: Send + Sync {
    fn highlight(&self, code: &str) -> Result<Vec<HighlightSpan>, HighlightError>;
}

/// Language registry with plain-text fallback
#[derive(Clone)]
pub struct Highlighter {
    strategies: HashMap<String, Arc<dyn LanguageHighlighter>>,
    class_prefix: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("languages", &self.strategies.len())
            .field("class_prefix", &self.class_prefix)
            .finish()
    }
}

impl Highlighter {
    /// A highlighter that knows no languages
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }

    /// Registry with the bundled grammars (when the `code-highlight` feature is on)
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut highlighter = Self::empty();

        #[cfg(feature = "code-highlight")]
        {
            for tag in syntect_backend::language_tags() {
                let strategy = Arc::new(syntect_backend::TaggedSyntect { tag: tag.clone() });
                highlighter.strategies.insert(tag, strategy);
            }
            log::debug!("Registered {} highlight language tags", highlighter.strategies.len());
        }

        highlighter
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// Register a strategy for a language tag (case-insensitive)
    pub fn register(&mut self, language: &str, strategy: Arc<dyn LanguageHighlighter>) {
        self.strategies.insert(language.to_lowercase(), strategy);
    }

    pub fn supports(&self, language: &str) -> bool {
        self.strategies.contains_key(&language.to_lowercase())
    }

    /// Highlight `code` for `language`. Never fails.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> HighlightedCode {
        let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) else {
            return HighlightedCode::Plain(code.to_string());
        };

        let Some(strategy) = self.strategies.get(&language.to_lowercase()) else {
            log::debug!("No highlighter for language '{}', using plain text", language);
            return HighlightedCode::Plain(code.to_string());
        };

        let result = catch_unwind(AssertUnwindSafe(|| strategy.highlight(code)))
            .unwrap_or(Err(HighlightError::Panicked));

        match result {
            Ok(spans) if spans_cover(&spans, code) => HighlightedCode::Highlighted(spans),
            Ok(_) => {
                log::warn!("Highlighter for '{}' changed the source text, using plain text", language);
                HighlightedCode::Plain(code.to_string())
            }
            Err(e) => {
                log::warn!("Highlighting '{}' failed: {}", language, e);
                HighlightedCode::Plain(code.to_string())
            }
        }
    }
}

/// Spans must reproduce the code exactly
fn spans_cover(spans: &[HighlightSpan], code: &str) -> bool {
    let mut rest = code;
    for span in spans {
        match rest.strip_prefix(span.text.as_str()) {
            Some(remaining) => rest = remaining,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Append a span, merging it into the previous one when classes match
pub(crate) fn push_span(spans: &mut Vec<HighlightSpan>, class: Option<&str>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.class.as_deref() == class {
            last.text.push_str(text);
            return;
        }
    }
    spans.push(HighlightSpan {
        class: class.map(str::to_string),
        text: text.to_string(),
    });
}

#[cfg(feature = "code-highlight")]
mod syntect_backend {
    use once_cell::sync::Lazy;
    use syntect::easy::ScopeRegionIterator;
    use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
    use syntect::util::LinesWithEndings;

    use super::{push_span, HighlightError, HighlightSpan, LanguageHighlighter};

    static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

    /// Every name and file extension of the bundled grammars, lowercased
    pub fn language_tags() -> Vec<String> {
        let mut tags = Vec::new();
        for syntax in SYNTAX_SET.syntaxes() {
            tags.push(syntax.name.to_lowercase());
            tags.extend(syntax.file_extensions.iter().map(|e| e.to_lowercase()));
        }
        tags
    }

    /// Token class for a scope string, innermost scope first
    fn class_for_scope(scope: &str) -> Option<&'static str> {
        const MAPPING: &[(&str, &str)] = &[
            ("comment", "comment"),
            ("string", "string"),
            ("constant.numeric", "number"),
            ("constant", "literal"),
            ("keyword", "keyword"),
            ("storage", "keyword"),
            ("entity.name", "title"),
            ("support", "built_in"),
            ("variable", "variable"),
        ];

        MAPPING
            .iter()
            .find(|(prefix, _)| scope.starts_with(prefix))
            .map(|(_, class)| *class)
    }

    fn class_for_stack(stack: &ScopeStack) -> Option<&'static str> {
        stack
            .as_slice()
            .iter()
            .rev()
            .find_map(|scope| class_for_scope(&scope.build_string()))
    }

    /// Syntect strategy bound to a language tag
    pub struct TaggedSyntect {
        pub tag: String,
    }

    impl LanguageHighlighter for TaggedSyntect {
        fn highlight(&self, code: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
            let syntax = SYNTAX_SET
                .find_syntax_by_token(&self.tag)
                .ok_or_else(|| HighlightError::Tokenize(format!("unknown syntax '{}'", self.tag)))?;
            highlight_with(syntax, code)
        }
    }

    fn highlight_with(
        syntax: &syntect::parsing::SyntaxReference,
        code: &str,
    ) -> Result<Vec<HighlightSpan>, HighlightError> {
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut spans = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = state
                .parse_line(line, &SYNTAX_SET)
                .map_err(|e| HighlightError::Tokenize(e.to_string()))?;

            for (text, op) in ScopeRegionIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|e| HighlightError::Tokenize(format!("{:?}", e)))?;
                push_span(&mut spans, class_for_stack(&stack), text);
            }
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperKeywords;

    impl LanguageHighlighter for UpperKeywords {
        fn highlight(&self, code: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
            let mut spans = Vec::new();
            for word in code.split_inclusive(' ') {
                let class = word
                    .trim()
                    .chars()
                    .all(|c| c.is_ascii_uppercase())
                    .then_some("keyword");
                push_span(&mut spans, class, word);
            }
            Ok(spans)
        }
    }

    struct Broken;

    impl LanguageHighlighter for Broken {
        fn highlight(&self, _code: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
            Err(HighlightError::Tokenize("boom".to_string()))
        }
    }

    struct Panicky;

    impl LanguageHighlighter for Panicky {
        fn highlight(&self, _code: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
            panic!("grammar bug")
        }
    }

    struct Lossy;

    impl LanguageHighlighter for Lossy {
        fn highlight(&self, _code: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
            Ok(vec![HighlightSpan::plain("something else")])
        }
    }

    #[test]
    fn test_missing_language_is_plain() {
        let highlighter = Highlighter::empty();
        assert_eq!(
            highlighter.highlight("x = 1", None),
            HighlightedCode::Plain("x = 1".to_string())
        );
        assert_eq!(
            highlighter.highlight("x = 1", Some("  ")),
            HighlightedCode::Plain("x = 1".to_string())
        );
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let highlighter = Highlighter::empty();
        let result = highlighter.highlight("code", Some("notalanguage"));
        assert_eq!(result, HighlightedCode::Plain("code".to_string()));
    }

    #[test]
    fn test_registered_strategy_is_case_insensitive() {
        let mut highlighter = Highlighter::empty();
        highlighter.register("Shout", Arc::new(UpperKeywords));
        assert!(highlighter.supports("shout"));

        let result = highlighter.highlight("LET x", Some("SHOUT"));
        assert_eq!(
            result,
            HighlightedCode::Highlighted(vec![
                HighlightSpan::classed("keyword", "LET "),
                HighlightSpan::plain("x"),
            ])
        );
        assert_eq!(result.source(), "LET x");
    }

    #[test]
    fn test_failures_fall_back_to_plain() {
        let mut highlighter = Highlighter::empty();
        highlighter.register("broken", Arc::new(Broken));
        highlighter.register("panicky", Arc::new(Panicky));
        highlighter.register("lossy", Arc::new(Lossy));

        for language in ["broken", "panicky", "lossy"] {
            let result = highlighter.highlight("fn main() {}", Some(language));
            assert_eq!(result, HighlightedCode::Plain("fn main() {}".to_string()));
        }
    }

    #[test]
    fn test_push_span_merges() {
        let mut spans = Vec::new();
        push_span(&mut spans, Some("string"), "\"a");
        push_span(&mut spans, Some("string"), "b\"");
        push_span(&mut spans, None, "");
        push_span(&mut spans, None, ";");
        assert_eq!(
            spans,
            vec![
                HighlightSpan::classed("string", "\"ab\""),
                HighlightSpan::plain(";"),
            ]
        );
    }

    #[cfg(feature = "code-highlight")]
    #[test]
    fn test_bundled_rust_grammar() {
        let highlighter = Highlighter::with_defaults();
        assert!(highlighter.supports("rust"));
        assert!(highlighter.supports("rs"));

        let result = highlighter.highlight("fn main() {}\n", Some("rust"));
        match result {
            HighlightedCode::Highlighted(spans) => {
                assert!(spans
                    .iter()
                    .any(|s| s.class.as_deref() == Some("keyword") && s.text.contains("fn")));
            }
            HighlightedCode::Plain(_) => panic!("expected highlighted output"),
        }
    }
}
