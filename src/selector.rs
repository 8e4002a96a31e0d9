//! Selectors matching tag tree nodes.
//!
//! A selector is `(tag, attribute, value, text_pattern)`, each part optional.
//! The pseudo attribute [`TEXT_ATTRIBUTE`] compares the node's reconstructed
//! text instead of a real attribute.

use regex::Regex;

use crate::patterns::{self, Pattern};
use crate::text;
use crate::tree::Node;
use crate::Result;

/// Attribute name that matches against reconstructed text.
pub const TEXT_ATTRIBUTE: &str = "text";

/// Marker on a start selector's tag making its rule optional.
pub const OPTIONAL_MARKER: char = '?';

/// Predicate over tag name, attribute and text.
#[derive(Debug, Clone)]
pub struct Selector {
    tag: Option<String>,
    attribute: Option<String>,
    value: Option<Pattern>,
    text_pattern: Option<Regex>,
}

impl Selector {
    /// Build a selector; `value` may carry the `r:` regex prefix.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] when `value` is a bad regex.
    pub fn new(tag: Option<&str>, attribute: Option<&str>, value: Option<&str>) -> Result<Self> {
        Ok(Self {
            tag: tag.map(str::to_ascii_lowercase),
            attribute: attribute.map(str::to_string),
            value: value.map(Pattern::parse).transpose()?,
            text_pattern: None,
        })
    }

    /// Selector on the tag name alone.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            attribute: None,
            value: None,
            text_pattern: None,
        }
    }

    /// Shorthand for `Selector::new(Some(tag), Some(attribute), Some(value))`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] when `value` is a bad regex.
    pub fn attr(tag: &str, attribute: &str, value: &str) -> Result<Self> {
        Self::new(Some(tag), Some(attribute), Some(value))
    }

    /// Additionally require the reconstructed text to match `pattern` at its
    /// start.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] when `pattern` does not compile.
    pub fn with_text_pattern(mut self, pattern: &str) -> Result<Self> {
        self.text_pattern = Some(patterns::anchored(pattern)?);
        Ok(self)
    }

    /// Tag name constraint, if any.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Test the selector against a node.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if tag != node.tag() {
                return false;
            }
        }

        let attribute_hit = match (&self.attribute, &self.value) {
            (Some(name), Some(value)) if name == TEXT_ATTRIBUTE => {
                value.is_match(text::finish(&node.text()).trim())
            }
            (Some(name), Some(value)) => node.attribute_values(name).any(|v| value.is_match(v)),
            _ => true,
        };

        match &self.text_pattern {
            Some(pattern) if attribute_hit => pattern.is_match(&node.text()),
            _ => attribute_hit,
        }
    }
}

/// Whether any selector of the set matches.
#[must_use]
pub fn any_matches(selectors: &[Selector], node: &Node) -> bool {
    selectors.iter().any(|selector| selector.matches(node))
}
