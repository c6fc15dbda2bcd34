//! Result types for transform and migration output.
//!
//! Soft failures inside a page never become errors. They are logged and
//! collected in [`Warnings`] so callers can inspect what degraded.

use serde::{Deserialize, Serialize};

/// Date reported when the fetched page body was empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Non-fatal issues met while transforming one article.
///
/// Pushing a warning also emits it through `tracing::warn!`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a warning.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.0.push(message);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether any warning contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|w| w.contains(needle))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Output of the document transformer for one article.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Publish date (`YYYY/MM/DD`), or [`NOT_AVAILABLE`] for an empty page.
    pub date: String,

    /// Canonical topics written to the article, in order.
    pub topics: Vec<String>,

    /// Canonical products written to the article, in order.
    pub products: Vec<String>,

    /// Soft failures encountered on the way.
    pub warnings: Warnings,
}

impl TransformOutcome {
    /// Outcome for an empty fetched body.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            date: NOT_AVAILABLE.to_string(),
            ..Self::default()
        }
    }

    /// Whether a real date was produced (the page was not empty).
    #[must_use]
    pub fn has_date(&self) -> bool {
        self.date != NOT_AVAILABLE
    }
}

/// How a migration run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    /// The article was transformed and persisted.
    Imported,

    /// The ledger already lists the URL and `force` was off.
    AlreadyImported,

    /// The fetched page was empty; nothing was written.
    Empty,
}

/// Success-shaped result of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub status: MigrationStatus,

    /// Resulting publish date, [`NOT_AVAILABLE`] for an empty page, absent
    /// when the run was short-circuited by the ledger.
    pub date: Option<String>,

    /// Source URL, echoed back.
    pub url: String,

    /// RFC 3339 UTC completion time.
    pub timestamp: String,

    /// Human-readable summary.
    pub message: String,

    /// Warnings raised while transforming.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
