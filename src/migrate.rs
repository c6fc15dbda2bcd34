//! Migration orchestrator: one article URL in, one report out.
//!
//! The run resolves the article context, consults the ledger, transforms and
//! stores the page, then records the import and registers the redirect.
//! Page-level problems only degrade the output; collaborator I/O failures
//! fail the run with a [`MigrationFailure`] echoing the URL.

use crate::context::ArticleContext;
use crate::error::{Error, Result};
use crate::fetch::{EmbedFetcher, HttpFetcher, PageFetcher};
use crate::options::MigrationOptions;
use crate::redirect::{FastlyRegistrar, RedirectRegistrar};
use crate::result::{MigrationReport, MigrationStatus, TransformOutcome, NOT_AVAILABLE};
use crate::store::{self, DocumentStore, FsDocumentStore, FsLedgerStore, LedgerRow, LedgerStore};
use crate::taxonomy::{self, MappingTable};
use crate::transform::Transformer;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Failed run, echoing the article URL.
#[derive(Debug, thiserror::Error)]
#[error("{url}: {message}")]
pub struct MigrationFailure {
    pub url: String,
    pub message: String,
}

/// External collaborators of a run.
#[derive(Clone)]
pub struct Services {
    pub pages: Arc<dyn PageFetcher>,
    pub embeds: Arc<dyn EmbedFetcher>,
    pub documents: Arc<dyn DocumentStore>,
    pub ledger: Arc<dyn LedgerStore>,
    /// `None` when no redirect credentials are configured.
    pub redirects: Option<Arc<dyn RedirectRegistrar>>,
}

impl Services {
    /// Filesystem stores, the HTTP fetcher and, when credentials are given,
    /// the Fastly registrar.
    pub fn local(options: &MigrationOptions) -> Result<Self> {
        let credentials = options
            .credentials
            .as_ref()
            .ok_or_else(|| Error::Config("missing document store credentials".to_string()))?;

        let mut fetcher = HttpFetcher::new()?;
        if let Some(dir) = &options.cache_dir {
            fetcher = fetcher.with_cache_dir(dir.clone());
        }
        let fetcher = Arc::new(fetcher);

        let redirects = match &options.redirect {
            Some(creds) => {
                Some(Arc::new(FastlyRegistrar::new(creds.clone())?) as Arc<dyn RedirectRegistrar>)
            }
            None => None,
        };

        Ok(Self {
            pages: fetcher.clone(),
            embeds: fetcher,
            documents: Arc::new(FsDocumentStore::new(credentials.documents.clone())),
            ledger: Arc::new(FsLedgerStore::new(credentials.ledger.clone())),
            redirects,
        })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Run one migration.
pub async fn run(
    options: &MigrationOptions,
    services: &Services,
) -> std::result::Result<MigrationReport, MigrationFailure> {
    let started = Instant::now();
    let result = migrate(options, services).await;
    tracing::info!("Process done in {}s", started.elapsed().as_secs());

    result.map_err(|e| {
        tracing::error!("Migration of {} failed: {e}", options.url);
        MigrationFailure {
            url: options.url.clone(),
            message: e.to_string(),
        }
    })
}

async fn migrate(options: &MigrationOptions, services: &Services) -> Result<MigrationReport> {
    options.validate()?;
    let ctx = ArticleContext::from_url(&options.url)?;
    tracing::info!("Migrating {} ({})", ctx.source, ctx.language);

    if !options.force && store::is_imported(services.ledger.as_ref(), &ctx.source).await? {
        tracing::info!("{} already imported, skipping", ctx.source);
        return Ok(MigrationReport {
            status: MigrationStatus::AlreadyImported,
            date: None,
            url: ctx.source.clone(),
            timestamp: now(),
            message: format!("{} has already been imported.", ctx.source),
            warnings: Vec::new(),
        });
    }

    let loaded;
    let mappings: &MappingTable = match &options.mappings {
        Some(table) => table,
        None => {
            loaded = taxonomy::load(services.ledger.as_ref()).await?;
            &loaded
        }
    };

    let raw_html = services.pages.fetch(&ctx.source).await?;
    let transformer = Transformer {
        store: services.documents.as_ref(),
        embeds: services.embeds.as_ref(),
        mapping: mappings.for_language(ctx.language),
        check_related_exists: options.check_related_exists,
    };
    let mut outcome = transformer.transform(&ctx, &raw_html).await?;

    if outcome.has_date() {
        register_redirect(services, &ctx, &mut outcome).await?;
    }
    if options.update_ledger {
        record_import(services, &ctx, &outcome.date).await?;
    }

    if !outcome.has_date() {
        return Ok(MigrationReport {
            status: MigrationStatus::Empty,
            date: Some(NOT_AVAILABLE.to_string()),
            url: ctx.source.clone(),
            timestamp: now(),
            message: format!("Nothing to import from {}: empty page", ctx.source),
            warnings: outcome.warnings.into_vec(),
        });
    }

    Ok(MigrationReport {
        status: MigrationStatus::Imported,
        date: Some(outcome.date),
        url: ctx.source.clone(),
        timestamp: now(),
        message: format!("Successfully imported {}", ctx.source),
        warnings: outcome.warnings.into_vec(),
    })
}

/// Append `[date, url, now]` to the ledger. Empty pages are recorded with
/// the `N/A` date.
async fn record_import(services: &Services, ctx: &ArticleContext, date: &str) -> Result<()> {
    let row = LedgerRow {
        date: date.to_string(),
        url: ctx.source.clone(),
        imported_at: now(),
    };
    services
        .ledger
        .append_row(store::URLS_TABLE, row.into_row())
        .await
}

async fn register_redirect(
    services: &Services,
    ctx: &ArticleContext,
    outcome: &mut TransformOutcome,
) -> Result<()> {
    match &services.redirects {
        Some(registrar) => registrar.register(&ctx.source, &outcome.date).await,
        None => {
            outcome.warnings.push(format!(
                "Unable to create redirect for {}: missing redirect credentials",
                ctx.source
            ));
            Ok(())
        }
    }
}
