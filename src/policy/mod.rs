//! Site policies and the template engine that applies them.
//!
//! A [`Policy`] binds a URL pattern to a [`TemplateSet`]. Extraction parses
//! the document with the policy's tag overrides, then tries the templates
//! until one satisfies all of its required rules.
//!
//! ```rust
//! use rs_purifier::policy::{Policy, Rule};
//! use rs_purifier::selector::Selector;
//!
//! let policy = Policy::builder("policy_example", "r:https?://example\\.com/")
//!     .template(vec![
//!         Rule::new(Selector::tag("h1")),
//!         Rule::new(Selector::attr("div", "class", "body")?)
//!             .end(Selector::attr("div", "class", "footer")?),
//!     ])
//!     .compact(true)
//!     .build()?;
//!
//! let html = r#"<h1>X</h1><div class="body">Hello<div class="footer">bye</div></div>"#;
//! let matched = policy.extract("https://example.com/a", html, 512)?;
//! assert_eq!(matched.text, "X\n\nHello");
//! # Ok::<(), rs_purifier::Error>(())
//! ```

pub mod definition;
mod engine;
mod template;

pub use definition::{parse_definitions, PolicyDefinition};
pub use engine::compact;
pub use template::{Rule, Template, TemplateSet, DEFAULT_TEMPLATE};

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::patterns::Pattern;
use crate::selector::Selector;
use crate::tree::{self, Document, TagTable};
use crate::{Error, Result};

/// MIME type a policy serves unless told otherwise.
pub const DEFAULT_MIME: &str = "text/html";

/// Separator appended after every matched node's text.
pub const DEFAULT_SEPARATOR: &str = "\n";

const NO_MEMO: usize = usize::MAX;

/// Text produced by a policy and the template that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMatch {
    pub text: String,
    pub template: String,
}

/// A site-specific extraction policy.
#[derive(Debug)]
pub struct Policy {
    name: String,
    url_pattern: Pattern,
    excerpt_pattern: Option<Pattern>,
    mime: String,
    compact: bool,
    separator: String,
    templates: TemplateSet,
    tags: TagTable,
    last_success: AtomicUsize,
}

impl Policy {
    /// Start building a policy served for URLs matching `url_pattern`.
    #[must_use]
    pub fn builder(name: impl Into<String>, url_pattern: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder::new(name, url_pattern)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url_pattern(&self) -> &Pattern {
        &self.url_pattern
    }

    #[must_use]
    pub fn excerpt_pattern(&self) -> Option<&Pattern> {
        self.excerpt_pattern.as_ref()
    }

    /// Normalized MIME type of the handler the policy belongs to.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    #[must_use]
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    #[must_use]
    pub fn tag_table(&self) -> &TagTable {
        &self.tags
    }

    /// Whether `url` is a listing or teaser page this policy refuses.
    #[must_use]
    pub fn is_excerpt(&self, url: &str) -> bool {
        self.excerpt_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(url))
    }

    /// Name of the template that matched in the latest call, if it matched.
    #[must_use]
    pub fn memoized_template(&self) -> Option<&str> {
        self.memo().map(|index| self.templates.templates()[index].name())
    }

    /// Parse `html` with this policy's tag overrides.
    #[must_use]
    pub fn parse(&self, html: &str, max_depth: usize) -> Document {
        tree::parse(html, &self.tags, max_depth)
    }

    /// Parse `html` and run the templates over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHandlerMatched`] when no template matches.
    pub fn extract(&self, url: &str, html: &str, max_depth: usize) -> Result<PolicyMatch> {
        let document = self.parse(html, max_depth);
        self.extract_document(url, &document)
    }

    /// Run the templates over an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHandlerMatched`] when no template matches.
    pub fn extract_document(&self, url: &str, document: &Document) -> Result<PolicyMatch> {
        engine::run(self, url, document)
    }

    fn memo(&self) -> Option<usize> {
        let index = self.last_success.load(Ordering::Relaxed);
        (index < self.templates.len()).then_some(index)
    }

    fn remember(&self, index: usize) {
        self.last_success.store(index, Ordering::Relaxed);
    }

    fn forget(&self) {
        self.last_success.store(NO_MEMO, Ordering::Relaxed);
    }
}

/// Builder for [`Policy`].
///
/// Patterns are compiled in [`PolicyBuilder::build`], so every definition
/// error surfaces there.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    name: String,
    url_pattern: String,
    excerpt_pattern: Option<String>,
    mime: String,
    compact: bool,
    separator: String,
    templates: Vec<(String, Vec<Rule>)>,
    ordered: bool,
    ignore_tags: Vec<String>,
    drop_tags: Vec<Selector>,
    ignore_tags_with_data: Vec<String>,
}

impl PolicyBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_pattern: url_pattern.into(),
            excerpt_pattern: None,
            mime: DEFAULT_MIME.to_string(),
            compact: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            templates: Vec::new(),
            ordered: false,
            ignore_tags: Vec::new(),
            drop_tags: Vec::new(),
            ignore_tags_with_data: Vec::new(),
        }
    }

    /// Add the [`DEFAULT_TEMPLATE`].
    #[must_use]
    pub fn template(self, rules: Vec<Rule>) -> Self {
        self.named_template(DEFAULT_TEMPLATE, rules)
    }

    /// Add a named template.
    #[must_use]
    pub fn named_template(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.templates.push((name.into(), rules));
        self
    }

    /// Try templates in insertion order instead of name order.
    #[must_use]
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    #[must_use]
    pub fn excerpt_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.excerpt_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn mime(mut self, mime: &str) -> Self {
        self.mime = crate::agent::normalize_mime(mime);
        self
    }

    #[must_use]
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Extra tags whose whole subtree is excluded.
    #[must_use]
    pub fn ignore_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Elements excluded with their content when they match.
    #[must_use]
    pub fn drop_tag(mut self, selector: Selector) -> Self {
        self.drop_tags.push(selector);
        self
    }

    /// Extra tags that are unwrapped: the element goes, its content stays.
    #[must_use]
    pub fn ignore_tags_with_data<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_tags_with_data
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Compile the patterns and assemble the policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a bad URL or excerpt regex and
    /// [`Error::InvalidPolicy`] for a policy without templates or with a
    /// template without rules.
    pub fn build(self) -> Result<Policy> {
        if self.templates.is_empty() {
            return Err(Error::InvalidPolicy(format!(
                "policy {} declares no templates",
                self.name
            )));
        }
        if let Some((template, _)) = self.templates.iter().find(|(_, rules)| rules.is_empty()) {
            return Err(Error::InvalidPolicy(format!(
                "template {template} of policy {} has no rules",
                self.name
            )));
        }

        let templates = if self.ordered {
            TemplateSet::ordered(self.templates)
        } else {
            TemplateSet::named(self.templates)
        };

        Ok(Policy {
            url_pattern: Pattern::parse(&self.url_pattern)?,
            excerpt_pattern: self.excerpt_pattern.as_deref().map(Pattern::parse).transpose()?,
            tags: TagTable::with_overrides(
                &self.ignore_tags,
                &self.drop_tags,
                &self.ignore_tags_with_data,
            ),
            name: self.name,
            mime: self.mime,
            compact: self.compact,
            separator: self.separator,
            templates,
            last_success: AtomicUsize::new(NO_MEMO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_without_templates_is_invalid() {
        let err = Policy::builder("empty", "r:.*").build().unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy(_)));
    }

    #[test]
    fn test_template_without_rules_is_invalid() {
        let err = Policy::builder("empty_rules", "r:.*")
            .named_template("full", vec![Rule::new(Selector::tag("h1"))])
            .named_template("hollow", vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPolicy(ref message) if message.contains("hollow")));
    }

    #[test]
    fn test_bad_url_pattern_is_invalid() {
        let err = Policy::builder("bad", "r:(unclosed")
            .template(vec![Rule::new(Selector::tag("h1"))])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_excerpt_pattern() {
        let policy = Policy::builder("p", "r:.*/article/.*")
            .excerpt_url_pattern("r:.*/category/.*")
            .template(vec![Rule::new(Selector::tag("h1"))])
            .build()
            .unwrap();
        assert!(policy.is_excerpt("https://example.com/category/article/1"));
        assert!(!policy.is_excerpt("https://example.com/article/1"));
    }

    #[test]
    fn test_mime_is_normalized() {
        let policy = Policy::builder("p", "r:.*")
            .mime("Text/Plain; charset=utf-8")
            .template(vec![Rule::new(Selector::tag("p"))])
            .build()
            .unwrap();
        assert_eq!(policy.mime(), "text/plain");
        assert_eq!(policy.separator(), DEFAULT_SEPARATOR);
        assert!(policy.memoized_template().is_none());
    }
}
