//! Configuration options for a migration run.
//!
//! `MigrationOptions` carries the article URL plus the switches that decide
//! how much of the run touches external state.

use crate::error::{Error, Result};
use crate::redirect::RedirectCredentials;
use crate::taxonomy::MappingTable;
use std::path::PathBuf;
use std::sync::Arc;

/// Locations of the document store and the import ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    /// Root directory of the markdown document store.
    pub documents: PathBuf,

    /// Root directory of the ledger tables.
    pub ledger: PathBuf,
}

/// Configuration options for one migration run.
///
/// # Example
///
/// ```rust
/// use article_migrator::{MigrationOptions, StoreCredentials};
///
/// let options = MigrationOptions {
///     url: "https://cmo.example.com/articles/2020/1/post.html".to_string(),
///     credentials: Some(StoreCredentials {
///         documents: "out/docs".into(),
///         ledger: "out/ledger".into(),
///     }),
///     force: false,
///     ..MigrationOptions::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct MigrationOptions {
    /// Source article URL.
    ///
    /// Default: empty (must be set)
    pub url: String,

    /// Re-import even when the ledger already lists the URL.
    ///
    /// Default: `true`
    pub force: bool,

    /// Skip author and topic documents that already exist.
    ///
    /// When `false`, every related document is rewritten.
    ///
    /// Default: `true`
    pub check_related_exists: bool,

    /// Append the import to the ledger's `urls` table.
    ///
    /// Default: `true`
    pub update_ledger: bool,

    /// Document store and ledger locations.
    ///
    /// Default: `None` (must be set)
    pub credentials: Option<StoreCredentials>,

    /// Preloaded mapping tables, shared across runs.
    ///
    /// When `None` the tables are read from the ledger on every run.
    ///
    /// Default: `None`
    pub mappings: Option<Arc<MappingTable>>,

    /// Edge dictionary credentials. Without them no redirect is registered.
    ///
    /// Default: `None`
    pub redirect: Option<RedirectCredentials>,

    /// Directory caching fetched pages between runs.
    ///
    /// Default: `None`
    pub cache_dir: Option<PathBuf>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            force: true,
            check_related_exists: true,
            update_ledger: true,
            credentials: None,
            mappings: None,
            redirect: None,
            cache_dir: None,
        }
    }
}

impl MigrationOptions {
    /// Options for `url` with every other field at its default.
    #[must_use]
    pub fn for_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Check that the run has what it needs before anything is fetched.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("no article url given".to_string()));
        }
        if self.credentials.is_none() {
            return Err(Error::Config(
                "missing document store credentials".to_string(),
            ));
        }
        Ok(())
    }
}
