//! Per-MIME handlers: policy registry, dispatch and post-processing.
//!
//! Dispatch for a URL:
//! 1. any registered policy whose excerpt pattern matches refuses the page
//!    with [`Error::ExcerptPage`],
//! 2. the first policy (registration order) whose URL pattern matches
//!    extracts the text,
//! 3. without a match the handler's default applies: plain text is returned
//!    as is, HTML goes through the readability fallback.

pub mod fallback;
pub mod links;
pub mod postproc;

use tracing::{debug, warn};

use crate::options::AgentOptions;
use crate::patterns::Pattern;
use crate::policy::Policy;
use crate::result::{Extraction, Links, Reason};
use crate::{Error, Result};

pub use postproc::{EmptyField, PostContext, PostProcessor, TitleExtractor, TITLE_FIELD};

/// MIME type of the HTML handler.
pub const HTML_MIME: &str = "text/html";

/// MIME type of the plain-text handler.
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// What a handler does with content no policy claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Readability summary, when enabled.
    Html,
    /// Content returned unchanged.
    PlainText,
}

/// Policies and post-processors for one MIME type.
pub struct Handler {
    kind: HandlerKind,
    mime: String,
    registry: Vec<(Pattern, Policy)>,
    post_processors: Vec<Box<dyn PostProcessor>>,
    readability_fallback: bool,
    max_tree_depth: usize,
}

impl Handler {
    /// Handler for `text/html`.
    #[must_use]
    pub fn html(options: &AgentOptions) -> Self {
        let mut handler = Self::new(HandlerKind::Html, HTML_MIME, options);
        if options.extract_title {
            handler.add_post_processor(Box::new(TitleExtractor::new(options.default_title.clone())));
        }
        handler
    }

    /// Handler for `text/plain`.
    #[must_use]
    pub fn plain_text(options: &AgentOptions) -> Self {
        let mut handler = Self::new(HandlerKind::PlainText, PLAIN_TEXT_MIME, options);
        if options.extract_title {
            handler.add_post_processor(Box::new(EmptyField::new(TITLE_FIELD)));
        }
        handler
    }

    /// Handler for another MIME type, without post-processors.
    #[must_use]
    pub fn new(kind: HandlerKind, mime: &str, options: &AgentOptions) -> Self {
        Self {
            kind,
            mime: crate::agent::normalize_mime(mime),
            registry: Vec::new(),
            post_processors: Vec::new(),
            readability_fallback: options.readability_fallback,
            max_tree_depth: options.max_tree_depth,
        }
    }

    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Registered policies in dispatch order.
    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.registry.iter().map(|(_, policy)| policy)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Register `policy` for URLs matching `url_pattern`.
    ///
    /// Registering the same pattern string again replaces the earlier
    /// policy and keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when `url_pattern` does not compile.
    pub fn register(&mut self, url_pattern: &str, policy: Policy) -> Result<()> {
        let pattern = Pattern::parse(url_pattern)?;
        if let Some(slot) = self.registry.iter_mut().find(|(p, _)| *p == pattern) {
            warn!(
                url_pattern,
                replaced = slot.1.name(),
                policy = policy.name(),
                "URL pattern registered twice, replacing the earlier policy"
            );
            slot.1 = policy;
        } else {
            debug!(url_pattern, policy = policy.name(), mime = %self.mime, "registered policy");
            self.registry.push((pattern, policy));
        }
        Ok(())
    }

    pub fn add_post_processor(&mut self, post_processor: Box<dyn PostProcessor>) {
        self.post_processors.push(post_processor);
    }

    /// The policy that serves `url`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExcerptPage`] when any policy's excerpt pattern
    /// matches, regardless of URL patterns.
    pub fn select(&self, url: &str) -> Result<Option<(&Pattern, &Policy)>> {
        if let Some(policy) = self.policies().find(|policy| policy.is_excerpt(url)) {
            let pattern = policy
                .excerpt_pattern()
                .map(Pattern::as_definition)
                .unwrap_or_default();
            debug!(url, policy = policy.name(), pattern = %pattern, "excerpt page");
            return Err(Error::ExcerptPage {
                url: url.to_string(),
                pattern,
            });
        }

        Ok(self
            .registry
            .iter()
            .find(|(pattern, _)| pattern.is_match(url))
            .map(|(pattern, policy)| (pattern, policy)))
    }

    /// Extract `content` fetched from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExcerptPage`] for refused pages and
    /// [`Error::NoHandlerMatched`] when neither a policy nor the default
    /// can produce text.
    pub fn handle(&self, url: &str, content: &str, want_links: bool) -> Result<Extraction> {
        let (text, reason) = match self.select(url)? {
            Some((pattern, policy)) => {
                let matched = policy.extract(url, content, self.max_tree_depth)?;
                let reason = Reason {
                    policy: Some(policy.name().to_string()),
                    template: Some(matched.template),
                    url_pattern: Some(pattern.as_definition()),
                };
                (matched.text, reason)
            }
            None => (self.unmatched(url, content)?, Reason::default()),
        };

        let ctx = PostContext::new(url, content, &text);
        let links = want_links.then(|| match self.kind {
            HandlerKind::Html => links::extract_links(url, ctx.document(), &text),
            HandlerKind::PlainText => Links {
                text: links::text_links(&text),
                ..Links::default()
            },
        });

        let mut annotations = std::collections::BTreeMap::new();
        for post_processor in &self.post_processors {
            let value = post_processor.process(&ctx).unwrap_or_else(|err| {
                warn!(url, field = post_processor.field(), error = %err, "post-processor failed");
                post_processor.default_value()
            });
            annotations.insert(post_processor.field().to_string(), value);
        }
        let title = annotations.remove(TITLE_FIELD);

        Ok(Extraction {
            text,
            title,
            links,
            annotations,
            reason,
        })
    }

    fn unmatched(&self, url: &str, content: &str) -> Result<String> {
        let no_match = || Error::NoHandlerMatched {
            url: url.to_string(),
        };
        match self.kind {
            HandlerKind::PlainText => Ok(content.to_string()),
            HandlerKind::Html if self.readability_fallback => {
                fallback::summarize(content, self.max_tree_depth).map_err(|err| {
                    warn!(url, error = %err, "readability fallback failed");
                    no_match()
                })
            }
            HandlerKind::Html => Err(no_match()),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &self.kind)
            .field("mime", &self.mime)
            .field("policies", &self.len())
            .field("post_processors", &self.post_processors.len())
            .finish_non_exhaustive()
    }
}
