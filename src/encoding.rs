//! Character encoding detection and transcoding for fetched pages.
//!
//! Legacy article pages are not all UTF-8. The charset is taken from the
//! HTTP `Content-Type` header when present, otherwise from meta tags in the
//! document head, and the body is decoded to UTF-8 before parsing.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// `<meta charset="...">`
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// `charset=...` parameter of a `Content-Type` value.
#[allow(clippy::expect_used)]
static CHARSET_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Detect character encoding from an optional `Content-Type` header and the
/// first 1024 bytes of the body. Defaults to UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    // Covers both `<meta charset>` and the http-equiv Content-Type form.
    CHARSET_META_RE
        .captures(&head_str)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

fn charset_param(content_type: &str) -> Option<String> {
    CHARSET_PARAM_RE
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a fetched body to UTF-8, replacing invalid sequences with U+FFFD.
#[must_use]
pub fn decode_body(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(html, content_type);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(html);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_charset_wins_over_meta() {
        let html = br#"<html><head><meta charset="utf-8"></head><body>Caf\xE9</body></html>"#;
        let encoding = detect_encoding(html, Some("text/html; charset=ISO-8859-1"));
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(encoding.name(), "windows-1252");
    }

    #[test]
    fn meta_charset_used_without_header() {
        let html = br#"<html><head><meta charset="windows-1252"></head></html>"#;
        assert_eq!(detect_encoding(html, None).name(), "windows-1252");
        assert_eq!(detect_encoding(html, Some("text/html")).name(), "windows-1252");
    }

    #[test]
    fn http_equiv_charset_detected() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(detect_encoding(html, None).name(), "windows-1252");
    }

    #[test]
    fn default_to_utf8() {
        assert_eq!(detect_encoding(b"<html><body>Test</body></html>", None), UTF_8);
    }

    #[test]
    fn decode_latin1_body() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode_body(html, None).contains("Café"));
    }

    #[test]
    fn decode_invalid_utf8_does_not_panic() {
        let result = decode_body(b"<p>Test \xFF\xFE Invalid</p>", None);
        assert!(result.contains("Test"));
        assert!(result.contains("Invalid"));
    }
}
