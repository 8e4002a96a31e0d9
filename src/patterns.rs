//! URL/attribute patterns and compiled static regexes.
//!
//! Policy definitions write patterns as plain strings. A string starting with
//! [`REGEX_PREFIX`] is a regular expression, anything else is compared
//! verbatim. Regexes match at the start of the subject only, the same way
//! every selector and URL pattern in a policy file is written.

#![allow(clippy::expect_used)]

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Prefix marking a pattern string as a regular expression.
pub const REGEX_PREFIX: &str = "r:";

/// An exact string or a start-anchored regular expression.
#[derive(Clone)]
pub enum Pattern {
    /// Whole-string equality.
    Exact(String),
    /// Regex matched at the start of the subject. `source` keeps the
    /// expression as written (without the prefix).
    Regex {
        /// Expression as written in the definition.
        source: String,
        /// Compiled, start-anchored form.
        regex: Regex,
    },
}

impl Pattern {
    /// Parse a pattern string, compiling it when it carries [`REGEX_PREFIX`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when the regex does not compile.
    pub fn parse(text: &str) -> Result<Self> {
        match text.strip_prefix(REGEX_PREFIX) {
            Some(source) => Ok(Self::Regex {
                source: source.to_string(),
                regex: anchored(source)?,
            }),
            None => Ok(Self::Exact(text.to_string())),
        }
    }

    /// Test the pattern against a subject string.
    #[must_use]
    pub fn is_match(&self, subject: &str) -> bool {
        match self {
            Self::Exact(value) => value == subject,
            Self::Regex { regex, .. } => regex.is_match(subject),
        }
    }

    /// The pattern as it would be written in a policy definition.
    #[must_use]
    pub fn as_definition(&self) -> String {
        match self {
            Self::Exact(value) => value.clone(),
            Self::Regex { source, .. } => format!("{REGEX_PREFIX}{source}"),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_definition())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_definition() == other.as_definition()
    }
}

/// Compile `source` so that it only matches at the start of the subject.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] on a compilation failure.
pub fn anchored(source: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{source})")).map_err(|source_err| Error::InvalidPattern {
        pattern: source.to_string(),
        source: source_err,
    })
}

// =============================================================================
// Markup preprocessing
// =============================================================================

/// HTML comments, stripped before tokenizing.
pub static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("HTML_COMMENT regex"));

/// Legacy IE conditional blocks.
pub static IE_CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-\[if (?:IE|lte IE \d+)\]>[\s\S]*?<!\[endif\]->").expect("IE_CONDITIONAL regex")
});

// =============================================================================
// Output normalization
// =============================================================================

/// Three or more newlines in a row.
pub static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_LINE_RUN regex"));

/// http(s) URLs written in extracted text.
pub static TEXT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("TEXT_URL regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern_requires_equality() {
        let pattern = Pattern::parse("https://example.com/a").unwrap();
        assert!(pattern.is_match("https://example.com/a"));
        assert!(!pattern.is_match("https://example.com/a/b"));
    }

    #[test]
    fn test_regex_pattern_matches_at_start_only() {
        let pattern = Pattern::parse(r"r:https?://example\.com/\d+").unwrap();
        assert!(pattern.is_match("https://example.com/42"));
        assert!(pattern.is_match("https://example.com/42/trailing"));
        assert!(!pattern.is_match("see https://example.com/42"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let pattern = Pattern::parse("r:a|b").unwrap();
        assert!(pattern.is_match("bx"));
        assert!(!pattern.is_match("xb"));
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = Pattern::parse("r:(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_definition_round_trips_prefix() {
        let pattern = Pattern::parse("r:crayon-line.*").unwrap();
        assert_eq!(pattern.as_definition(), "r:crayon-line.*");
    }

    #[test]
    fn test_comment_patterns() {
        let html = "a<!-- x\n y -->b<!-[if IE]>old<![endif]->c<!-[if lte IE 8]>z<![endif]->d";
        let stripped = HTML_COMMENT.replace_all(html, "");
        let stripped = IE_CONDITIONAL.replace_all(&stripped, "");
        assert_eq!(stripped, "abcd");
    }
}
