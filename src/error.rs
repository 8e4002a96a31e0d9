//! Error types for rs-purifier.
//!
//! Extraction outcomes other than success are variants of [`Error`]: callers
//! match on the variant instead of catching control-flow exceptions.

use std::path::PathBuf;

/// Error type for policy loading and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No template of the selected policy matched the document, or no policy
    /// matched the URL and the handler has no usable default.
    #[error("No registered handler can process URL={url}")]
    NoHandlerMatched {
        /// URL of the rejected document.
        url: String,
    },

    /// The URL matched a policy's excerpt pattern (listing or teaser page).
    #[error("Hit excerpt page URL pattern {pattern} for URL={url}")]
    ExcerptPage {
        /// URL of the skipped document.
        url: String,
        /// The excerpt pattern that matched.
        pattern: String,
    },

    /// No handler is registered for the content's MIME type.
    #[error("Content type={0} is not supported yet")]
    UnsupportedMime(String),

    /// A `r:` pattern failed to compile.
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern text, without the `r:` prefix.
        pattern: String,
        /// Compilation error from the regex engine.
        #[source]
        source: regex::Error,
    },

    /// A policy definition is structurally wrong.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// A policy definition is not valid JSON for the definition format.
    #[error("Policy definition parsing failed: {0}")]
    PolicyJson(#[from] serde_json::Error),

    /// A policy file or directory could not be read.
    #[error("Failed to read policies from {}: {source}", path.display())]
    PolicyLoad {
        /// The file or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The readability fallback could not summarize the document.
    #[error("Fallback extraction failed: {0}")]
    Fallback(String),
}

impl Error {
    /// True when the caller should skip the document rather than retry it.
    #[must_use]
    pub fn should_skip(&self) -> bool {
        matches!(self, Self::ExcerptPage { .. })
    }

    /// True when no template could parse the content.
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoHandlerMatched { .. })
    }
}

/// Result type alias for rs-purifier operations.
pub type Result<T> = std::result::Result<T, Error>;
