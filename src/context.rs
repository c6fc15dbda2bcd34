//! Per-article values resolved once from the source URL.

use crate::error::{Error, Result};
use crate::url_utils;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Folder for article bodies under the language prefix.
pub const TYPE_POST: &str = "publish";

/// Folder for author profiles under the language prefix.
pub const TYPE_AUTHOR: &str = "authors";

/// Folder for topic stubs under the language prefix.
pub const TYPE_TOPIC: &str = "topics";

/// Output language of a migrated article. Doubles as the output path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
}

impl Language {
    /// Every language the mapping tables are loaded for.
    pub const ALL: [Language; 2] = [Language::En, Language::De];

    /// Language of an article URL: German when the path contains `/de/`.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        if url.path().contains("/de/") {
            Language::De
        } else {
            Language::En
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable values for one migration run.
#[derive(Debug, Clone)]
pub struct ArticleContext {
    /// Source article URL as given by the caller.
    pub source: String,

    /// Parsed source URL.
    pub url: Url,

    /// `scheme://host[:port]` used to qualify root-relative sources.
    pub origin: String,

    /// Output language and path prefix.
    pub language: Language,

    /// Publish date, `YYYY/MM/DD`.
    pub date: String,

    /// Final path segment of the URL without extension.
    pub slug: String,

    /// Whether `date` had to fall back to today because the URL carries none.
    pub date_inferred: bool,
}

impl ArticleContext {
    /// Resolve the context for `source`. Fails only for an unusable URL.
    pub fn from_url(source: &str) -> Result<Self> {
        let url = url_utils::parse_url(source)
            .ok_or_else(|| Error::Config(format!("invalid article url: {source}")))?;

        let (date, date_inferred) = match url_utils::date_from_path(url.path()) {
            Some(d) => (d, false),
            None => {
                tracing::warn!("No publish date in {source}, using today's date");
                (Utc::now().date_naive(), true)
            }
        };

        Ok(Self {
            source: source.trim().to_string(),
            origin: url_utils::origin(&url),
            language: Language::from_url(&url),
            date: date.format("%Y/%m/%d").to_string(),
            slug: url_utils::slug(&url),
            date_inferred,
            url,
        })
    }

    /// Label spliced under the byline.
    #[must_use]
    pub fn posted_on(&self) -> String {
        format!("posted on {}", self.date)
    }

    /// Output path prefix (the language code).
    #[must_use]
    pub fn output_prefix(&self) -> &'static str {
        self.language.as_str()
    }

    /// `{lang}/publish/{YYYY/MM/DD}`
    #[must_use]
    pub fn publish_path(&self) -> String {
        format!("{}/{TYPE_POST}/{}", self.output_prefix(), self.date)
    }
}

/// `{prefix}/authors`
#[must_use]
pub fn author_path(prefix: &str) -> String {
    format!("{prefix}/{TYPE_AUTHOR}")
}

/// `{prefix}/topics`
#[must_use]
pub fn topic_path(prefix: &str) -> String {
    format!("{prefix}/{TYPE_TOPIC}")
}
