//! Filesystem-backed stores.

use super::{DocumentStore, LedgerStore};
use crate::dom;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes each document as `{root}/{path}/{name}.md`.
///
/// Bodies arrive as HTML and are converted to markdown on write. Embed
/// placeholders become a paragraph holding the bare URL.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of document `name` under logical `path`.
    #[must_use]
    pub fn file_path(&self, path: &str, name: &str) -> PathBuf {
        self.root.join(path).join(format!("{name}.md"))
    }
}

/// Convert a stored HTML body to markdown.
pub fn render_markdown(body: &str) -> Result<String> {
    let doc = dom::parse(body);
    dom::rename(&doc.select("hlxembed"), "p");
    let html = dom::inner_html(&doc.select("body"));
    htmd::convert(&html).map_err(|e| Error::Store(format!("markdown conversion failed: {e}")))
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn exists(&self, path: &str, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.file_path(path, name)).await?)
    }

    async fn create(&self, path: &str, name: &str, body: &str) -> Result<()> {
        let target = self.file_path(path, name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let markdown = render_markdown(body)?;
        tokio::fs::write(&target, markdown).await?;
        tracing::debug!("wrote {}", target.display());
        Ok(())
    }
}

/// One JSON-lines file per table: `{root}/{table}.jsonl`, each line a JSON
/// array of strings.
#[derive(Debug, Clone)]
pub struct FsLedgerStore {
    root: PathBuf,
}

impl FsLedgerStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.jsonl"))
    }
}

#[async_trait]
impl LedgerStore for FsLedgerStore {
    async fn get_rows(&self, table: &str) -> Result<Vec<Vec<String>>> {
        let path = self.table_path(table);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<Vec<String>>(line)
                    .map_err(|e| Error::Ledger(format!("{}: {e}", path.display())))
            })
            .collect()
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let mut line = serde_json::to_string(&row)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(table))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
