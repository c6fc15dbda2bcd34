//! # article-migrator
//!
//! Migrates published articles from a legacy CMS into a markdown content
//! store.
//!
//! Given an article URL, the page is fetched and its HTML rewritten into a
//! normalized document: images qualified, hero and title sections
//! reordered, byline spliced in, embeds replaced by canonical placeholders,
//! inline markup merged, and topic/product lines appended. The body is
//! stored together with an author profile and topic stubs, the import is
//! recorded in a ledger and a redirect registered at the edge.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use article_migrator::{migrate, MigrationOptions, Services, StoreCredentials};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let options = MigrationOptions {
//!     credentials: Some(StoreCredentials {
//!         documents: "out/docs".into(),
//!         ledger: "out/ledger".into(),
//!     }),
//!     ..MigrationOptions::for_url("https://cmo.example.com/articles/2020/1/post.html")
//! };
//! let services = Services::local(&options)?;
//! let report = migrate::run(&options, &services).await?;
//! println!("{}: {:?}", report.message, report.date);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Problems inside a page (missing hero, unmapped topic, unreachable embed)
//! only degrade the output and are reported as warnings. An empty page
//! yields the date `"N/A"`. Store, ledger and registrar failures fail the
//! run.

mod error;
mod options;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// URL utilities: origin, slug, date-from-path and source qualification.
pub mod url_utils;

/// Character encoding detection and transcoding of fetched pages.
pub mod encoding;

/// Per-article context resolved from the source URL.
pub mod context;

/// Third-party embed detection and canonical URL resolution.
pub mod embed;

/// Adjacent inline element merging and boundary whitespace relocation.
pub mod inline;

/// Author byline and profile extraction.
pub mod author;

/// Topic and product classification against mapping tables.
pub mod taxonomy;

/// The ordered document rewrite pipeline.
pub mod transform;

/// Page and embed fetching.
pub mod fetch;

/// Document and ledger stores.
pub mod store;

/// Edge redirect registration.
pub mod redirect;

/// Migration orchestrator.
pub mod migrate;

// Public API - re-exports
pub use context::{ArticleContext, Language};
pub use error::{Error, Result};
pub use migrate::{MigrationFailure, Services};
pub use options::{MigrationOptions, StoreCredentials};
pub use redirect::RedirectCredentials;
pub use result::{
    MigrationReport, MigrationStatus, TransformOutcome, Warnings, NOT_AVAILABLE,
};
pub use taxonomy::MappingTable;
pub use transform::Transformer;
