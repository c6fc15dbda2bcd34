//! Redirect registration at the CDN edge.
//!
//! A migrated article URL is mapped to its new publish date in an edge
//! dictionary, so the old URL can be redirected to the new location.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;

/// Default Fastly API endpoint.
pub const FASTLY_API: &str = "https://api.fastly.com";

/// Registers `source URL → target` redirect entries.
#[async_trait]
pub trait RedirectRegistrar: Send + Sync {
    async fn register(&self, source_url: &str, target: &str) -> Result<()>;
}

/// Credentials for the edge dictionary holding redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCredentials {
    pub service_id: String,
    pub token: String,
    pub dictionary_id: String,
}

impl RedirectCredentials {
    /// Credentials only count as configured when every field is set.
    #[must_use]
    pub fn from_parts(
        service_id: Option<String>,
        token: Option<String>,
        dictionary_id: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            service_id: non_empty(service_id)?,
            token: non_empty(token)?,
            dictionary_id: non_empty(dictionary_id)?,
        })
    }
}

/// Upserts dictionary items through the Fastly API.
#[derive(Debug, Clone)]
pub struct FastlyRegistrar {
    client: Client,
    api_base: String,
    credentials: RedirectCredentials,
}

impl FastlyRegistrar {
    pub fn new(credentials: RedirectCredentials) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_base: FASTLY_API.to_string(),
            credentials,
        })
    }

    /// Point at another API endpoint (a proxy or a mock server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Item endpoint for a source URL.
    #[must_use]
    pub fn item_url(&self, source_url: &str) -> String {
        format!(
            "{}/service/{}/dictionary/{}/item/{}",
            self.api_base,
            self.credentials.service_id,
            self.credentials.dictionary_id,
            urlencoding::encode(source_url)
        )
    }
}

#[async_trait]
impl RedirectRegistrar for FastlyRegistrar {
    async fn register(&self, source_url: &str, target: &str) -> Result<()> {
        let response = self
            .client
            .put(self.item_url(source_url))
            .header("Fastly-Key", &self.credentials.token)
            .header("Accept", "application/json")
            .form(&[("item_value", target)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Redirect(format!("{source_url}: {status} {body}")));
        }
        tracing::info!("Registered redirect {source_url} -> {target}");
        Ok(())
    }
}

/// Keeps registrations in memory.
#[derive(Debug, Default)]
pub struct RecordingRegistrar {
    entries: Mutex<Vec<(String, String)>>,
}

impl RecordingRegistrar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations so far, in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RedirectRegistrar for RecordingRegistrar {
    async fn register(&self, source_url: &str, target: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((source_url.to_string(), target.to_string()));
        Ok(())
    }
}
