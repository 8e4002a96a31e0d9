//! Tag classification tables for the tree builder.
//!
//! Arrays list the defaults, `HashSet`s serve lookups. A [`TagTable`] merges
//! the defaults with the overrides a policy declares.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::selector::Selector;

// === Default Tag Lists ===

/// Tags excluded from the tree together with their whole subtree.
pub static IGNORE_TAGS: [&str; 17] = [
    "colgroup", "col", "param", "input", "script", "noscript", "iframe", "style", "meta",
    "link", "embed", "nav", "form", "button", "head", "textarea", "label",
];

/// Tags whose wrapper is dropped while their text stays with the parent.
pub static IGNORE_KEEP_DATA_TAGS: [&str; 4] = ["p", "br", "img", "dt"];

/// Tags whose wrapper is dropped together with the text right after them.
pub static IGNORE_NO_DATA_TAGS: [&str; 1] = ["dl"];

/// Tags dropped from the tree that still start a new line.
pub static IGNORE_WITH_NEWLINE_TAGS: [&str; 1] = ["hr"];

/// Tags that append a newline text leaf to the current node when opened.
pub static PREFIX_NEWLINE_TAGS: [&str; 4] = ["ul", "p", "blockquote", "hr"];

/// Tags that receive a line-break marker when an end tag closes over them.
pub static NEWLINE_ON_CLOSE_TAGS: [&str; 13] = [
    "dl", "dd", "h1", "h2", "h3", "h4", "h5", "div", "p", "section", "tr", "header", "blockquote",
];

/// Elements that never have an end tag.
pub static VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements that may appear inside `head`. Any other start tag closes it.
pub static HEAD_CONTENT_TAGS: [&str; 8] = [
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// `PREFIX_NEWLINE_TAGS` as a `HashSet`
pub static PREFIX_NEWLINE_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| PREFIX_NEWLINE_TAGS.into_iter().collect());

/// `NEWLINE_ON_CLOSE_TAGS` as a `HashSet`
pub static NEWLINE_ON_CLOSE_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| NEWLINE_ON_CLOSE_TAGS.into_iter().collect());

/// `VOID_TAGS` as a `HashSet`
pub static VOID_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| VOID_TAGS.into_iter().collect());

/// Check if a tag opens a newline before itself
#[inline]
#[must_use]
pub fn is_prefix_newline_tag(tag: &str) -> bool {
    PREFIX_NEWLINE_TAG_SET.contains(tag)
}

/// Check if closing over a tag appends a line break to it
#[inline]
#[must_use]
pub fn is_newline_on_close_tag(tag: &str) -> bool {
    NEWLINE_ON_CLOSE_TAG_SET.contains(tag)
}

/// Check if a tag is a void element
#[inline]
#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAG_SET.contains(tag)
}

/// Whether a start tag `tag` ends an open `open` element whose end tag
/// HTML allows to be omitted.
#[must_use]
pub fn implicitly_closes(open: &str, tag: &str) -> bool {
    match open {
        "head" => !HEAD_CONTENT_TAGS.contains(&tag),
        "colgroup" => !matches!(tag, "col" | "template"),
        _ => false,
    }
}

// === Classification ===

/// How the builder treats a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    /// Becomes a node.
    Normal,
    /// Excluded with its subtree.
    Ignore,
    /// Wrapper dropped, text kept.
    IgnoreKeepData,
    /// Wrapper dropped, following text discarded.
    IgnoreNoData,
    /// Wrapper dropped, newline kept.
    IgnoreWithNewline,
}

impl TagClass {
    /// True for every class that keeps the tag out of the tree.
    #[must_use]
    pub fn is_ignored(self) -> bool {
        self != Self::Normal
    }
}

/// Per-policy tag handling: the default lists plus overrides.
#[derive(Debug, Clone)]
pub struct TagTable {
    ignore: HashSet<String>,
    keep_data: HashSet<String>,
    no_data: HashSet<String>,
    with_newline: HashSet<String>,
    drop: Vec<Selector>,
}

impl TagTable {
    /// Merge extra tags into the defaults.
    ///
    /// Overrides only ever add to the default lists.
    #[must_use]
    pub fn with_overrides(
        ignore_tags: &[String],
        drop_tags: &[Selector],
        ignore_tags_with_data: &[String],
    ) -> Self {
        let mut table = Self::default();
        table.ignore.extend(ignore_tags.iter().map(|t| t.to_ascii_lowercase()));
        table
            .keep_data
            .extend(ignore_tags_with_data.iter().map(|t| t.to_ascii_lowercase()));
        table.drop.extend(drop_tags.iter().cloned());
        table
    }

    /// Classify a tag by name.
    ///
    /// Subtree exclusion wins over the wrapper-only classes.
    #[must_use]
    pub fn classify(&self, tag: &str) -> TagClass {
        if self.ignore.contains(tag) {
            TagClass::Ignore
        } else if self.keep_data.contains(tag) {
            TagClass::IgnoreKeepData
        } else if self.no_data.contains(tag) {
            TagClass::IgnoreNoData
        } else if self.with_newline.contains(tag) {
            TagClass::IgnoreWithNewline
        } else {
            TagClass::Normal
        }
    }

    /// Drop selectors declared by the policy.
    #[must_use]
    pub fn drop_selectors(&self) -> &[Selector] {
        &self.drop
    }
}

impl Default for TagTable {
    fn default() -> Self {
        fn owned(tags: &[&str]) -> HashSet<String> {
            tags.iter().map(|t| (*t).to_string()).collect()
        }

        Self {
            ignore: owned(&IGNORE_TAGS),
            keep_data: owned(&IGNORE_KEEP_DATA_TAGS),
            no_data: owned(&IGNORE_NO_DATA_TAGS),
            with_newline: owned(&IGNORE_WITH_NEWLINE_TAGS),
            drop: Vec::new(),
        }
    }
}
