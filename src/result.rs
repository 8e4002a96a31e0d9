//! Result types for extraction output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Main content as plain text.
    pub text: String,

    /// Document title, when title extraction is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Links of the document, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,

    /// Fields produced by post-processors other than the title.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Which policy produced the text.
    pub reason: Reason,
}

/// Links found in a document, each list sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Every usable anchor target, resolved against the page URL.
    pub all: Vec<String>,

    /// Anchor targets whose anchor text appears in the extracted text.
    pub body: Vec<String>,

    /// http(s) URLs written out in the extracted text.
    pub text: Vec<String>,
}

/// Provenance of an extraction.
///
/// All fields are `None` when the content was returned as is or summarized
/// by the readability fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Name of the policy.
    pub policy: Option<String>,

    /// Name of the template that matched.
    pub template: Option<String>,

    /// URL pattern the policy was registered under, as written.
    pub url_pattern: Option<String>,
}

impl Reason {
    /// Whether a policy produced the text.
    #[must_use]
    pub fn is_policy(&self) -> bool {
        self.policy.is_some()
    }
}
