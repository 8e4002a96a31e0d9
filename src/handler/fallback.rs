//! Readability summary for HTML no policy claims.
//!
//! The summary markup is rendered through the same tag tree as policy
//! output so both read alike.

use crate::Result;

/// Title and main text of `html` as found by readability, compacted.
///
/// # Errors
///
/// Returns [`crate::Error::Fallback`] when readability rejects the document
/// or support is not compiled in.
#[cfg(feature = "readability")]
pub fn summarize(html: &str, max_depth: usize) -> Result<String> {
    use dom_smoothie::Readability;

    use crate::policy::compact;
    use crate::text;
    use crate::tree::{self, TagTable};
    use crate::Error;

    let mut reader = Readability::with_document(dom_query::Document::from(html), None, None)
        .map_err(|e| Error::Fallback(e.to_string()))?;
    let article = reader.parse().map_err(|e| Error::Fallback(e.to_string()))?;

    let content_html = article.content.to_string();
    let summary = tree::parse(&content_html, &TagTable::default(), max_depth);
    let body: Vec<String> = summary
        .roots()
        .iter()
        .map(|root| text::finish(&root.text()))
        .collect();

    Ok(compact(&format!("{}\n{}", article.title, body.join("\n"))))
}

/// Title and main text of `html` as found by readability, compacted.
///
/// # Errors
///
/// Always returns [`crate::Error::Fallback`]: the `readability` feature is
/// disabled.
#[cfg(not(feature = "readability"))]
pub fn summarize(_html: &str, _max_depth: usize) -> Result<String> {
    Err(crate::Error::Fallback(
        "built without the readability feature".to_string(),
    ))
}
