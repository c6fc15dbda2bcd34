//! Persistence collaborators: the document store articles are written to,
//! and the tabular ledger used for idempotency and taxonomy mappings.
//!
//! Both are narrow async traits so the pipeline can run against the
//! filesystem in production and in-memory tables in tests.

mod fs;
mod memory;

pub use fs::{FsDocumentStore, FsLedgerStore};
pub use memory::{MemoryDocumentStore, MemoryLedgerStore};

use crate::error::Result;
use async_trait::async_trait;

/// Ledger table listing imported article URLs.
pub const URLS_TABLE: &str = "urls";

/// Key-value document store organised by logical path and name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether a document `name` exists under `path`.
    async fn exists(&self, path: &str, name: &str) -> Result<bool>;

    /// Create or overwrite document `name` under `path` with an HTML body.
    async fn create(&self, path: &str, name: &str, body: &str) -> Result<()>;
}

/// Append-only tables of string rows.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All rows of `table`, in insertion order. A missing table has no rows.
    async fn get_rows(&self, table: &str) -> Result<Vec<Vec<String>>>;

    /// Append one row to `table`, creating the table if needed.
    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()>;
}

/// One entry of the migration ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// Resolved publish date of the article.
    pub date: String,
    /// Source article URL.
    pub url: String,
    /// RFC 3339 time of the import; empty for rows seeded by hand.
    pub imported_at: String,
}

impl LedgerRow {
    /// Read a raw row; rows with fewer than two columns are ignored.
    #[must_use]
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < 2 {
            return None;
        }
        Some(Self {
            date: row[0].clone(),
            url: row[1].clone(),
            imported_at: row.get(2).cloned().unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn into_row(self) -> Vec<String> {
        vec![self.date, self.url, self.imported_at]
    }

    /// A row marks its URL as imported only once it carries a timestamp.
    #[must_use]
    pub fn is_imported(&self) -> bool {
        !self.imported_at.trim().is_empty()
    }
}

/// Whether the ledger lists `url` as already imported.
pub async fn is_imported(ledger: &dyn LedgerStore, url: &str) -> Result<bool> {
    let rows = ledger.get_rows(URLS_TABLE).await?;
    let found = rows
        .iter()
        .filter_map(|r| LedgerRow::from_row(r))
        .find(|r| r.url == url);
    Ok(found.is_some_and(|r| r.is_imported()))
}

/// Make a label usable as a document name.
///
/// Strips characters that are invalid in file names and trims the result;
/// an empty return value means the label has no usable name.
#[must_use]
pub fn sanitize_name(label: &str) -> String {
    sanitize_filename::sanitize(label.trim()).trim().to_string()
}
