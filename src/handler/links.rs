//! Link collection over the document as received.

use std::collections::BTreeSet;

use dom_query::Document;
use tracing::debug;
use url::Url;

use crate::patterns::TEXT_URL;
use crate::result::Links;
use crate::url_utils::{is_skippable_href, resolve_link, strip_trailing_slash};

/// Collect the anchors of `document` and the URLs written in `text`.
///
/// `body` keeps the anchors whose text shows up in `text`, which is the
/// part of the page the policy considered content.
#[must_use]
pub fn extract_links(url: &str, document: &Document, text: &str) -> Links {
    let base = Url::parse(url).ok();
    let mut all = BTreeSet::new();
    let mut body = BTreeSet::new();

    for anchor in document.select("a[href]").iter() {
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        if is_skippable_href(&href) {
            continue;
        }

        let link = resolve_link(&href, base.as_ref());
        let anchor_text = anchor.text();
        let anchor_text = anchor_text.trim();
        if !anchor_text.is_empty() && text.contains(anchor_text) {
            debug!(link = %link, text = anchor_text, "body link");
            body.insert(link.clone());
        }
        all.insert(link);
    }

    Links {
        all: all.into_iter().collect(),
        body: body.into_iter().collect(),
        text: text_links(text),
    }
}

/// http(s) URLs written out in `text`, trailing `/` removed.
#[must_use]
pub fn text_links(text: &str) -> Vec<String> {
    TEXT_URL
        .find_iter(text)
        .map(|found| strip_trailing_slash(found.as_str()).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
