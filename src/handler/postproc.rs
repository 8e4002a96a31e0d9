//! Post-processors computing extra fields from an extracted document.

use std::cell::OnceCell;

use dom_query::Document;
use tracing::warn;

use crate::Result;

/// Field name of the title post-processors.
pub const TITLE_FIELD: &str = "title";

/// What a post-processor sees of one extraction.
pub struct PostContext<'a> {
    pub url: &'a str,
    /// The document as received.
    pub content: &'a str,
    /// The extracted main text.
    pub text: &'a str,
    document: OnceCell<Document>,
}

impl<'a> PostContext<'a> {
    #[must_use]
    pub fn new(url: &'a str, content: &'a str, text: &'a str) -> Self {
        Self {
            url,
            content,
            text,
            document: OnceCell::new(),
        }
    }

    /// The content parsed as an HTML DOM, parsed on first use.
    pub fn document(&self) -> &Document {
        self.document.get_or_init(|| Document::from(self.content))
    }
}

/// Computes one named field after the main text has been extracted.
///
/// A failing post-processor does not fail the extraction: its field falls
/// back to [`PostProcessor::default_value`].
pub trait PostProcessor: Send + Sync {
    /// Name of the field the result is stored under.
    fn field(&self) -> &str;

    /// Compute the field.
    ///
    /// # Errors
    ///
    /// Implementations report any failure; the handler logs it and uses
    /// the default value.
    fn process(&self, ctx: &PostContext<'_>) -> Result<String>;

    /// Value used when [`PostProcessor::process`] fails.
    fn default_value(&self) -> String {
        String::new()
    }
}

/// Text of the document's first `<title>`.
#[derive(Debug, Clone, Default)]
pub struct TitleExtractor {
    default: String,
}

impl TitleExtractor {
    /// `default` is reported for documents without a `<title>`.
    #[must_use]
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
        }
    }
}

impl PostProcessor for TitleExtractor {
    fn field(&self) -> &str {
        TITLE_FIELD
    }

    fn process(&self, ctx: &PostContext<'_>) -> Result<String> {
        let title = ctx.document().select("title");
        if title.exists() {
            Ok(title.first().text().trim().to_string())
        } else {
            warn!(url = ctx.url, "document does not have a <title> tag");
            Ok(self.default.clone())
        }
    }

    fn default_value(&self) -> String {
        self.default.clone()
    }
}

/// A field that is always empty, for content types without the concept.
#[derive(Debug, Clone)]
pub struct EmptyField {
    field: String,
}

impl EmptyField {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

impl PostProcessor for EmptyField {
    fn field(&self) -> &str {
        &self.field
    }

    fn process(&self, _ctx: &PostContext<'_>) -> Result<String> {
        Ok(String::new())
    }
}
