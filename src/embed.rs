//! Embed resolution.
//!
//! Legacy pages wrap third-party media in ad-hoc markup. Each
//! [`EmbedPattern`] pairs a matcher with an extractor over a read-only view
//! of the wrapper node, and patterns are tried in declaration order: the
//! first matcher that fires decides the outcome, even if its extractor comes
//! back empty.
//!
//! Extraction is synchronous. The one pattern that needs the network
//! returns [`Extraction::Canonicalize`] and the fetch happens in
//! [`finish`], so no DOM handle is needed while waiting on I/O.

use crate::dom::{self, Selection};
use crate::fetch::EmbedFetcher;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static SOUNDCLOUD_PLAYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"w\.soundcloud\.com/player").expect("valid regex"));

#[allow(clippy::expect_used)]
static GIPHY_MEDIA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"media\.giphy\.com").expect("valid regex"));

/// Which known embed shape matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// Audio player iframe; canonical link read from the player markup.
    SoundCloud,
    /// Instagram blockquote carrying `data-instgrm-permalink`.
    InstagramPermalink,
    /// Instagram blockquote without the data attribute; its link is used.
    InstagramLink,
    /// Tweet blockquote; the last link is the post permalink.
    Twitter,
    /// Adobe Spark presentation link.
    Spark,
    /// GIF served as a plain image.
    Giphy,
    /// Any other iframe.
    Iframe,
}

/// Result of running a pattern's extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Final answer, possibly empty.
    Ready(Option<String>),
    /// Fetch this player URL and read its canonical link; fall back to it.
    Canonicalize(String),
}

/// A matcher/extractor pair.
#[derive(Clone, Copy)]
pub struct EmbedPattern {
    pub kind: EmbedKind,
    pub matches: fn(&Selection) -> bool,
    pub extract: fn(&Selection) -> Extraction,
}

/// Patterns in priority order.
pub static EMBED_PATTERNS: [EmbedPattern; 7] = [
    EmbedPattern {
        kind: EmbedKind::SoundCloud,
        matches: soundcloud_matches,
        extract: soundcloud_extract,
    },
    EmbedPattern {
        kind: EmbedKind::InstagramPermalink,
        matches: instagram_permalink_matches,
        extract: instagram_permalink_extract,
    },
    EmbedPattern {
        kind: EmbedKind::InstagramLink,
        matches: instagram_link_matches,
        extract: instagram_link_extract,
    },
    EmbedPattern {
        kind: EmbedKind::Twitter,
        matches: twitter_matches,
        extract: twitter_extract,
    },
    EmbedPattern {
        kind: EmbedKind::Spark,
        matches: spark_matches,
        extract: spark_extract,
    },
    EmbedPattern {
        kind: EmbedKind::Giphy,
        matches: giphy_matches,
        extract: giphy_extract,
    },
    EmbedPattern {
        kind: EmbedKind::Iframe,
        matches: iframe_matches,
        extract: iframe_extract,
    },
];

/// Source of the first iframe: `src`, else lazy-load `data-src`.
#[must_use]
pub fn iframe_source(iframe: &Selection) -> Option<String> {
    dom::non_empty_attribute(iframe, "src").or_else(|| dom::non_empty_attribute(iframe, "data-src"))
}

fn soundcloud_matches(node: &Selection) -> bool {
    dom::get_attribute(&node.select("iframe"), "src")
        .is_some_and(|src| SOUNDCLOUD_PLAYER_RE.is_match(&src))
}

fn soundcloud_extract(node: &Selection) -> Extraction {
    match dom::non_empty_attribute(&node.select("iframe"), "src") {
        Some(src) => Extraction::Canonicalize(src),
        None => Extraction::Ready(None),
    }
}

fn instagram_permalink_matches(node: &Selection) -> bool {
    node.select(".instagram-media[data-instgrm-permalink]").exists()
}

fn instagram_permalink_extract(node: &Selection) -> Extraction {
    Extraction::Ready(dom::non_empty_attribute(
        &node.select(".instagram-media"),
        "data-instgrm-permalink",
    ))
}

fn instagram_link_matches(node: &Selection) -> bool {
    node.select(".instagram-media").exists()
}

fn instagram_link_extract(node: &Selection) -> Extraction {
    Extraction::Ready(dom::non_empty_attribute(&node.select(".instagram-media a"), "href"))
}

fn twitter_matches(node: &Selection) -> bool {
    node.select(".twitter-tweet a").exists()
}

fn twitter_extract(node: &Selection) -> Extraction {
    let links = node.select(".twitter-tweet a");
    let last = links
        .nodes()
        .last()
        .and_then(|a| a.attr("href"))
        .map(|href| href.to_string())
        .filter(|href| !href.is_empty());
    Extraction::Ready(last)
}

fn spark_matches(node: &Selection) -> bool {
    node.select("a.asp-embed-link").exists()
}

fn spark_extract(node: &Selection) -> Extraction {
    Extraction::Ready(dom::non_empty_attribute(&node.select("a.asp-embed-link"), "href"))
}

fn giphy_matches(node: &Selection) -> bool {
    dom::get_attribute(&node.select("img"), "src").is_some_and(|src| GIPHY_MEDIA_RE.is_match(&src))
}

fn giphy_extract(node: &Selection) -> Extraction {
    Extraction::Ready(dom::non_empty_attribute(&node.select("img"), "src"))
}

fn iframe_matches(node: &Selection) -> bool {
    iframe_source(&node.select("iframe")).is_some()
}

fn iframe_extract(node: &Selection) -> Extraction {
    Extraction::Ready(iframe_source(&node.select("iframe")))
}

/// Run the first matching pattern against an embed wrapper.
#[must_use]
pub fn probe(node: &Selection) -> Option<(EmbedKind, Extraction)> {
    EMBED_PATTERNS
        .iter()
        .find(|p| (p.matches)(node))
        .map(|p| (p.kind, (p.extract)(node)))
}

/// Turn an extraction into a URL, fetching the player markup if needed.
///
/// A failed canonicalization fetch falls back to the raw player URL.
pub async fn finish(extraction: Extraction, fetcher: &dyn EmbedFetcher) -> Option<String> {
    match extraction {
        Extraction::Ready(url) => url,
        Extraction::Canonicalize(src) => match fetcher.fetch_markup(&src).await {
            Ok(markup) => Some(canonical_link(&markup).unwrap_or(src)),
            Err(e) => {
                tracing::warn!("Cannot resolve soundcloud embed {src}: {e}");
                Some(src)
            }
        },
    }
}

/// `href` of the page's `link[rel="canonical"]`.
#[must_use]
pub fn canonical_link(markup: &str) -> Option<String> {
    if markup.trim().is_empty() {
        return None;
    }
    let doc = dom::parse(markup);
    dom::non_empty_attribute(&doc.select(r#"link[rel="canonical"]"#), "href")
}

/// Canonical source URL of an embed wrapper, if any pattern yields one.
pub async fn resolve(node: &Selection<'_>, fetcher: &dyn EmbedFetcher) -> Option<String> {
    let (_, extraction) = probe(node)?;
    finish(extraction, fetcher).await
}
