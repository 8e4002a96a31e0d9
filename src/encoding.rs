//! Character set detection and transcoding of fetched bytes.
//!
//! The charset is taken from the first source that names a known label:
//! the `charset` parameter of the MIME type, a `<meta charset>` tag, a
//! `<meta http-equiv="Content-Type">` tag. UTF-8 is the fallback.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Bytes of the document searched for meta declarations.
const META_SCAN_LIMIT: usize = 1024;

#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
static META_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?([^"'>]+)"#)
        .expect("valid regex")
});

/// The `charset` parameter of a MIME type such as `text/html; charset=utf-8`.
#[must_use]
pub fn mime_charset(mime: &str) -> Option<&str> {
    mime.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

/// The charset declared by the document's meta tags, if any.
#[must_use]
pub fn meta_charset(html: &str) -> Option<String> {
    if let Some(found) = META_CHARSET.captures(html).and_then(|c| c.get(1)) {
        return Some(found.as_str().to_string());
    }
    META_CONTENT_TYPE
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|content| mime_charset(content.as_str()).map(str::to_string))
}

/// Pick the encoding for `bytes` served as `mime`.
#[must_use]
pub fn detect_encoding(bytes: &[u8], mime: &str) -> &'static Encoding {
    if let Some(encoding) = mime_charset(mime).and_then(|label| Encoding::for_label(label.as_bytes())) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SCAN_LIMIT)]);
    meta_charset(&head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode `bytes` to UTF-8.
///
/// Malformed sequences become U+FFFD; decoding never fails.
///
/// # Examples
///
/// ```
/// use rs_purifier::encoding::transcode_to_utf8;
///
/// let html = b"<html><body>Caf\xE9</body></html>";
/// let text = transcode_to_utf8(html, "text/html; charset=ISO-8859-1");
/// assert!(text.contains("Café"));
/// ```
#[must_use]
pub fn transcode_to_utf8<'a>(bytes: &'a [u8], mime: &str) -> Cow<'a, str> {
    let encoding = detect_encoding(bytes, mime);
    if encoding == UTF_8 {
        return String::from_utf8_lossy(bytes);
    }
    let (decoded, _, _) = encoding.decode(bytes);
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_charset_parameter() {
        assert_eq!(mime_charset("text/html; charset=ISO-8859-1"), Some("ISO-8859-1"));
        assert_eq!(mime_charset("text/html;CHARSET=\"utf-8\""), Some("utf-8"));
        assert_eq!(mime_charset("text/html"), None);
        assert_eq!(mime_charset("text/html; boundary=x"), None);
    }

    #[test]
    fn test_mime_charset_wins_over_meta() {
        let html = br#"<html><head><meta charset="utf-8"></head></html>"#;
        assert_eq!(detect_encoding(html, "text/html; charset=windows-1252").name(), "windows-1252");
    }

    #[test]
    fn test_meta_charset_tag() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // ISO-8859-1 is an alias of windows-1252 in the WHATWG label table
        assert_eq!(detect_encoding(html, "text/html").name(), "windows-1252");
    }

    #[test]
    fn test_meta_content_type_tag() {
        let html = br#"<META HTTP-EQUIV="content-type" CONTENT="text/html; CHARSET=Shift_JIS">"#;
        assert_eq!(detect_encoding(html, "text/html").name(), "Shift_JIS");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        let html = br#"<meta charset="no-such-charset">"#;
        assert_eq!(detect_encoding(html, "text/html; charset=bogus"), UTF_8);
        assert_eq!(detect_encoding(b"<p>plain</p>", "text/html"), UTF_8);
    }

    #[test]
    fn test_transcode_windows1252() {
        let html = b"<meta charset=\"windows-1252\"><p>\x93Hello\x94</p>";
        assert!(transcode_to_utf8(html, "text/html").contains("\u{201C}Hello\u{201D}"));
    }

    #[test]
    fn test_transcode_invalid_utf8_is_lossy() {
        let text = transcode_to_utf8(b"Test \xFF\xFE Invalid", "text/plain");
        assert!(text.contains("Test"));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.contains("Invalid"));
    }
}
