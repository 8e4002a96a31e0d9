//! The extraction agent: handlers by MIME type.
//!
//! Registration happens on [`AgentBuilder`]; the built [`Agent`] is
//! immutable and can be shared by reference across threads.
//!
//! ```rust
//! use rs_purifier::{Agent, AgentOptions};
//!
//! let mut builder = Agent::builder(&AgentOptions::default());
//! builder.load_definitions_json(r#"{
//!     "name": "policy_example",
//!     "url_pattern": "r:https://example\\.com/story/.*",
//!     "templates": [[["div", "class", "story"], null]]
//! }"#)?;
//! let agent = builder.build();
//!
//! let html = r#"<div class="story">Once upon a time</div>"#;
//! let extraction = agent.extract("text/html", "https://example.com/story/1", html, false)?;
//! assert_eq!(extraction.text, "Once upon a time");
//! # Ok::<(), rs_purifier::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::encoding::transcode_to_utf8;
use crate::handler::Handler;
use crate::options::AgentOptions;
use crate::policy::{parse_definitions, Policy, PolicyDefinition};
use crate::result::Extraction;
use crate::{Error, Result};

/// File name prefix of policy files in a policy directory.
pub const POLICY_FILE_PREFIX: &str = "policy";

/// File name extension of policy files in a policy directory.
pub const POLICY_FILE_EXTENSION: &str = "json";

/// Lowercase MIME type without parameters.
///
/// ```rust
/// assert_eq!(rs_purifier::normalize_mime("Text/HTML; charset=UTF-8"), "text/html");
/// ```
#[must_use]
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Collects handlers and policies, then builds an [`Agent`].
#[derive(Debug)]
pub struct AgentBuilder {
    handlers: BTreeMap<String, Handler>,
}

impl AgentBuilder {
    /// Builder with the `text/html` and `text/plain` handlers configured
    /// from `options`.
    #[must_use]
    pub fn new(options: &AgentOptions) -> Self {
        let mut builder = Self {
            handlers: BTreeMap::new(),
        };
        builder.add_handler(Handler::html(options));
        builder.add_handler(Handler::plain_text(options));
        builder
    }

    /// Install a handler, replacing any handler of the same MIME type.
    pub fn add_handler(&mut self, handler: Handler) {
        if let Some(previous) = self.handlers.insert(handler.mime().to_string(), handler) {
            warn!(mime = previous.mime(), "handler replaced");
        }
    }

    /// Handler for `mime`, for adding post-processors or policies with a
    /// custom URL pattern.
    pub fn handler_mut(&mut self, mime: &str) -> Option<&mut Handler> {
        self.handlers.get_mut(&normalize_mime(mime))
    }

    /// Register `policy` under its own URL pattern with the handler of its
    /// MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMime`] when no handler serves the
    /// policy's MIME type.
    pub fn register(&mut self, policy: Policy) -> Result<()> {
        let url_pattern = policy.url_pattern().as_definition();
        let handler = self
            .handlers
            .get_mut(policy.mime())
            .ok_or_else(|| Error::UnsupportedMime(policy.mime().to_string()))?;
        handler.register(&url_pattern, policy)
    }

    /// Register every policy of a JSON document.
    ///
    /// All definitions are compiled before any is registered.
    ///
    /// # Errors
    ///
    /// Returns the first parse, compile or registration error.
    pub fn load_definitions_json(&mut self, json: &str) -> Result<usize> {
        let policies = parse_definitions(json)?
            .into_iter()
            .map(PolicyDefinition::into_policy)
            .collect::<Result<Vec<_>>>()?;
        if let Some(policy) = policies.iter().find(|p| !self.handlers.contains_key(p.mime())) {
            return Err(Error::UnsupportedMime(policy.mime().to_string()));
        }

        let count = policies.len();
        for policy in policies {
            self.register(policy)?;
        }
        Ok(count)
    }

    /// Register the policies of one JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyLoad`] when the file cannot be read, otherwise
    /// as [`AgentBuilder::load_definitions_json`].
    pub fn load_policy_file(&mut self, path: &Path) -> Result<usize> {
        let json = fs::read_to_string(path).map_err(|source| Error::PolicyLoad {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_definitions_json(&json)
    }

    /// Load every `policy*.json` file of `dir` in file name order.
    ///
    /// With `only`, files whose stem is not listed are skipped. A file that
    /// fails to load is logged and skipped.
    ///
    /// Returns the number of files loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyLoad`] when `dir` cannot be listed.
    pub fn load_policy_dir(&mut self, dir: &Path, only: Option<&[&str]>) -> Result<usize> {
        let read_error = |source: std::io::Error| Error::PolicyLoad {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            let is_policy_file = path.is_file()
                && path.extension().is_some_and(|ext| ext == POLICY_FILE_EXTENSION)
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(POLICY_FILE_PREFIX));
            if is_policy_file {
                files.push(path);
            }
        }
        files.sort();

        let mut loaded = 0;
        for path in files {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if only.is_some_and(|names| !names.contains(&stem)) {
                debug!(path = %path.display(), "policy file not selected");
                continue;
            }
            match self.load_policy_file(&path) {
                Ok(count) => {
                    info!(path = %path.display(), policies = count, "loaded policy file");
                    loaded += 1;
                }
                Err(err) => warn!(path = %path.display(), error = %err, "skipping policy file"),
            }
        }
        Ok(loaded)
    }

    #[must_use]
    pub fn build(self) -> Agent {
        Agent {
            handlers: self.handlers,
        }
    }
}

/// Immutable set of handlers serving extraction requests.
#[derive(Debug)]
pub struct Agent {
    handlers: BTreeMap<String, Handler>,
}

impl Agent {
    #[must_use]
    pub fn builder(options: &AgentOptions) -> AgentBuilder {
        AgentBuilder::new(options)
    }

    /// Handler serving `mime`, if any.
    #[must_use]
    pub fn handler(&self, mime: &str) -> Option<&Handler> {
        self.handlers.get(&normalize_mime(mime))
    }

    /// Extract the main text of `content` fetched from `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMime`] when no handler serves `mime`,
    /// - [`Error::ExcerptPage`] when a policy refuses the URL,
    /// - [`Error::NoHandlerMatched`] when nothing could produce text.
    pub fn extract(&self, mime: &str, url: &str, content: &str, want_links: bool) -> Result<Extraction> {
        let handler = self
            .handler(mime)
            .ok_or_else(|| Error::UnsupportedMime(normalize_mime(mime)))?;
        handler.handle(url, content, want_links)
    }

    /// Decode raw bytes, then [`Agent::extract`] them.
    ///
    /// The charset comes from the `charset` parameter of `mime`, then the
    /// document's meta tags, then defaults to UTF-8.
    ///
    /// # Errors
    ///
    /// As [`Agent::extract`].
    pub fn extract_bytes(&self, mime: &str, url: &str, bytes: &[u8], want_links: bool) -> Result<Extraction> {
        let content = transcode_to_utf8(bytes, mime);
        self.extract(mime, url, &content, want_links)
    }
}
