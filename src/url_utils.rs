//! URL Utility Functions
//!
//! Helpers for qualifying relative sources against the article's origin,
//! deriving the output name and publish date from the article URL, and
//! normalizing protocol-relative embed links.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Extension appended to root-relative image sources that have none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpeg";

/// `/YYYY/M[/D]` anywhere in a path.
#[allow(clippy::expect_used)]
static PATH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(\d{4})/(\d{1,2})(?:/(\d{1,2}))?(?:/|$)").expect("valid regex")
});

/// Parse a URL string into a `Url` object.
///
/// # Returns
/// * `Some(Url)` if valid absolute http(s) URL with a host, `None` otherwise
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    let url = Url::parse(url_str.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return None;
    }
    Some(url)
}

/// Get the origin (`scheme://host[:port]`) of a URL, without trailing slash.
#[must_use]
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// `//host/path` style source.
#[inline]
#[must_use]
pub fn is_protocol_relative(src: &str) -> bool {
    src.starts_with("//")
}

/// `/path` style source (but not `//host/path`).
#[inline]
#[must_use]
pub fn is_root_relative(src: &str) -> bool {
    src.starts_with('/') && !is_protocol_relative(src)
}

/// Rewrite `//host/x` to `https://host/x`; anything else is returned as-is.
///
/// # Examples
///
/// ```
/// use article_migrator::url_utils::normalize_protocol_relative;
///
/// assert_eq!(normalize_protocol_relative("//example.com/x"), "https://example.com/x");
/// assert_eq!(normalize_protocol_relative("http://example.com/x"), "http://example.com/x");
/// ```
#[must_use]
pub fn normalize_protocol_relative(src: &str) -> String {
    if is_protocol_relative(src) {
        format!("https:{src}")
    } else {
        src.to_string()
    }
}

/// Qualify a root-relative or protocol-relative source; others are unchanged.
#[must_use]
pub fn qualify(src: &str, origin: &str) -> String {
    if is_root_relative(src) {
        format!("{origin}{src}")
    } else {
        normalize_protocol_relative(src)
    }
}

/// Whether the last path segment of `src` carries a file extension.
#[must_use]
pub fn has_extension(src: &str) -> bool {
    let filename = extract_filename(src);
    filename
        .rfind('.')
        .is_some_and(|idx| idx > 0 && idx + 1 < filename.len())
}

/// Extract the filename from a URL path.
///
/// Strips query parameters and fragment identifiers, returning just the filename.
///
/// # Examples
///
/// ```
/// use article_migrator::url_utils::extract_filename;
///
/// assert_eq!(extract_filename("https://example.com/images/photo.jpg"), "photo.jpg");
/// assert_eq!(extract_filename("/path/to/image.png?v=123"), "image.png");
/// assert_eq!(extract_filename("https://example.com/"), "");
/// ```
#[must_use]
pub fn extract_filename(url: &str) -> String {
    let url = url.trim();

    if url.is_empty() {
        return String::new();
    }

    // Strip query parameters
    let without_query = url.split('?').next().unwrap_or(url);

    // Strip fragment identifiers
    let without_fragment = without_query.split('#').next().unwrap_or(without_query);

    // Get the last path segment
    let filename = without_fragment.rsplit('/').next().unwrap_or("").trim();

    // Don't return empty-looking filenames
    if filename.is_empty() || filename == "." || filename == ".." {
        return String::new();
    }

    filename.to_string()
}

/// Final path segment of the article URL without its extension.
///
/// This is the name the article body is stored under.
#[must_use]
pub fn slug(url: &Url) -> String {
    let filename = extract_filename(url.path());
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename[..idx].to_string(),
        _ => filename,
    }
}

/// Publish date encoded in the directory part of an article path.
///
/// Article paths look like `/articles/2016/6/slug`: year and month are
/// required, a day segment is optional and defaults to the 1st.
#[must_use]
pub fn date_from_path(path: &str) -> Option<NaiveDate> {
    let dir = match path.trim_end_matches('/').rfind('/') {
        Some(idx) => &path[..=idx],
        None => return None,
    };
    let caps = PATH_DATE_RE.captures(dir)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let day = caps.get(3).map_or(Some(1), |d| d.as_str().parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_requires_http_host() {
        assert!(parse_url("https://example.com/a").is_some());
        assert!(parse_url("  https://example.com/a  ").is_some());
        assert!(parse_url("/relative").is_none());
        assert!(parse_url("mailto:someone@example.com").is_none());
        assert!(parse_url("").is_none());
    }

    #[test]
    fn test_origin_drops_path() {
        let url = parse_url("https://example.com/articles/2020/1/x").expect("url");
        assert_eq!(origin(&url), "https://example.com");

        let url = parse_url("http://localhost:8080/a").expect("url");
        assert_eq!(origin(&url), "http://localhost:8080");
    }

    #[test]
    fn test_qualify_root_relative() {
        assert_eq!(qualify("/img/a.png", "https://example.com"), "https://example.com/img/a.png");
        assert_eq!(qualify("//cdn.example.com/a.png", "https://example.com"), "https://cdn.example.com/a.png");
        assert_eq!(qualify("https://other.com/a.png", "https://example.com"), "https://other.com/a.png");
        assert_eq!(qualify("img/a.png", "https://example.com"), "img/a.png");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("/img/foo.png"));
        assert!(has_extension("/img/foo.png?w=200"));
        assert!(!has_extension("/img/foo"));
        assert!(!has_extension("/img.d/foo"));
        assert!(!has_extension("/img/.hidden"));
    }

    #[test]
    fn test_slug_strips_extension() {
        let url = parse_url("https://example.com/articles/2020/1/some-post.html").expect("url");
        assert_eq!(slug(&url), "some-post");

        let url = parse_url("https://example.com/articles/2016/6/think-fast").expect("url");
        assert_eq!(slug(&url), "think-fast");
    }

    #[test]
    fn test_date_from_path() {
        assert_eq!(
            date_from_path("/articles/2016/6/think-fast"),
            NaiveDate::from_ymd_opt(2016, 6, 1)
        );
        assert_eq!(
            date_from_path("/de/articles/2017/11/von-bing"),
            NaiveDate::from_ymd_opt(2017, 11, 1)
        );
        assert_eq!(
            date_from_path("/articles/2019/7/22/post"),
            NaiveDate::from_ymd_opt(2019, 7, 22)
        );
        assert_eq!(date_from_path("/articles/post"), None);
        assert_eq!(date_from_path("/articles/2019/13/post"), None);
    }

    #[test]
    fn test_date_ignores_slug_segment() {
        // The slug itself never contributes to the date.
        assert_eq!(date_from_path("/articles/2020/1"), None);
    }
}
