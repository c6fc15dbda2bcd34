//! Network collaborators: the article page fetch and the embed
//! canonicalization fetch.

use crate::encoding;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Some embed hosts only emit their canonical link to a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.132 Safari/537.36";

/// Upper bound for the embed canonicalization request.
pub const EMBED_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for the article page request.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Fetches the rendered article page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw HTML of `url`, or an empty string when the page has no content.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches the markup of an embedded player so its canonical link can be read.
#[async_trait]
pub trait EmbedFetcher: Send + Sync {
    async fn fetch_markup(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with an optional on-disk page cache.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    cache_dir: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            cache_dir: None,
        })
    }

    /// Reuse pages stored in `dir` and store newly fetched ones there.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let key = url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .replace('/', "_");
        Some(dir.join(format!("{}.html", sanitize_filename::sanitize(key))))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let cache = self.cache_path(url);
        if let Some(path) = &cache {
            if tokio::fs::try_exists(path).await? {
                tracing::debug!("page cache hit for {url}");
                return Ok(tokio::fs::read_to_string(path).await?);
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{url} answered {status}, treating page as empty");
            return Ok(String::new());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;
        let html = encoding::decode_body(&bytes, content_type.as_deref());

        if let Some(path) = cache {
            if !html.is_empty() {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, &html).await?;
            }
        }

        Ok(html)
    }
}

#[async_trait]
impl EmbedFetcher for HttpFetcher {
    async fn fetch_markup(&self, url: &str) -> Result<String> {
        // Any status is accepted; error pages simply lack a canonical link.
        let response = self
            .client
            .get(url)
            .timeout(EMBED_FETCH_TIMEOUT)
            .send()
            .await?;
        Ok(response.text().await?)
    }
}

/// Serves canned pages and embed markup. Unknown pages are empty, unknown
/// embeds fail like an unreachable host.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    embeds: HashMap<String, String>,
}

impl StaticFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    #[must_use]
    pub fn with_embed(mut self, url: &str, html: &str) -> Self {
        self.embeds.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl EmbedFetcher for StaticFetcher {
    async fn fetch_markup(&self, url: &str) -> Result<String> {
        self.embeds
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("no route to {url}")))
    }
}
