//! URL Utility Functions
//!
//! Link filtering and resolution used when collecting the links of a
//! document.

use url::Url;

/// Whether an `href` value points nowhere useful.
///
/// Empty values, `javascript` pseudo links and `mailto:` addresses are
/// skipped.
#[must_use]
pub fn is_skippable_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href.starts_with("javascript") || href.starts_with("mailto:")
}

/// Resolve `href` against the page URL and drop one trailing `/`.
///
/// Values already starting with `http` are kept as written; without a
/// usable base the value is returned unresolved.
#[must_use]
pub fn resolve_link(href: &str, base: Option<&Url>) -> String {
    let href = href.trim();

    let link = if href.starts_with("http") {
        href.to_string()
    } else {
        base.and_then(|base| base.join(href).ok())
            .map_or_else(|| href.to_string(), |resolved| resolved.to_string())
    };

    strip_trailing_slash(&link).to_string()
}

/// Remove a single trailing `/`.
#[must_use]
pub fn strip_trailing_slash(link: &str) -> &str {
    link.strip_suffix('/').unwrap_or(link)
}
