//! Migrate one article and print the run report as JSON.
//!
//! ```text
//! migrate-article https://cmo.example.com/articles/2020/1/post.html \
//!     --store-root out/docs --ledger-root out/ledger
//! ```

use anyhow::Context;
use article_migrator::{
    migrate, MigrationOptions, RedirectCredentials, Services, StoreCredentials,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "migrate-article", about = "Migrate a legacy CMS article into the markdown store")]
struct Cli {
    /// Source article URL
    url: String,

    /// Skip the article when the ledger already lists it
    #[arg(long)]
    no_force: bool,

    /// Rewrite author and topic documents even when they exist
    #[arg(long)]
    no_check_related: bool,

    /// Do not record the import in the ledger
    #[arg(long)]
    no_update_ledger: bool,

    /// Root directory of the markdown document store
    #[arg(long, env = "MIGRATE_STORE_ROOT")]
    store_root: PathBuf,

    /// Root directory of the ledger tables
    #[arg(long, env = "MIGRATE_LEDGER_ROOT")]
    ledger_root: PathBuf,

    /// Cache fetched pages in this directory
    #[arg(long, env = "MIGRATE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[arg(long, env = "FASTLY_SERVICE_ID", hide_env_values = true)]
    fastly_service_id: Option<String>,

    #[arg(long, env = "FASTLY_TOKEN", hide_env_values = true)]
    fastly_token: Option<String>,

    #[arg(long, env = "FASTLY_DICTIONARY_ID", hide_env_values = true)]
    fastly_dictionary_id: Option<String>,
}

impl Cli {
    fn into_options(self) -> MigrationOptions {
        MigrationOptions {
            force: !self.no_force,
            check_related_exists: !self.no_check_related,
            update_ledger: !self.no_update_ledger,
            credentials: Some(StoreCredentials {
                documents: self.store_root,
                ledger: self.ledger_root,
            }),
            redirect: RedirectCredentials::from_parts(
                self.fastly_service_id,
                self.fastly_token,
                self.fastly_dictionary_id,
            ),
            cache_dir: self.cache_dir,
            ..MigrationOptions::for_url(&self.url)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Cli::parse().into_options();
    let services = Services::local(&options).context("failed to set up collaborators")?;

    match migrate::run(&options, &services).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(failure) => {
            let body = serde_json::json!({ "url": failure.url, "error": failure.message });
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}
