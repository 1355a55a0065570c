//! This module implements the full CLI interface for site-sync: handling command parsing,
//! main entrypoints, and user-visible invocations.
//!
//! All reconciliation logic (scanning, diffing, upload/cleanup phases) lives in the [`site-sync-core`] crate.
//! This module is strictly for CLI glue: loading config, constructing the store client, and
//! choosing how results are presented and turned into an exit status.
//!
//! ## Exit status
//! - Fatal errors (missing source directory, failed listing, bad config or credentials) fail the command.
//! - Per-file failures are printed but leave the exit status at success, unless `--strict`
//!   (or `strict: true` in the config) is set.
//!
//! ## Extending
//! When adding subcommands, update [`Commands`] below
//! and keep all non-trivial logic inside `site-sync-core`.
//!
//! [`site-sync-core`]: ../../site-sync-core/

use crate::load_config::load_config;
use crate::report::ConsoleReporter;
use crate::upload::AzureBlobClient;
use anyhow::Result;
use clap::{Parser, Subcommand};
use site_sync_core::config::SyncConfig;
use site_sync_core::contract::ObjectStore;
use site_sync_core::report::{Reporter, SyncReport};
use site_sync_core::synchronise::Reconciler;
use std::io::Write;
use std::path::PathBuf;

/// CLI for site-sync: mirror a generated static site into blob storage.
#[derive(Parser)]
#[clap(
    name = "site-sync",
    version,
    about = "Mirror a generated static site directory into an Azure Blob Storage container"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload every site file and delete remote objects that no longer exist locally
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Exit with an error if any single upload or delete failed
        #[clap(long)]
        strict: bool,
    },
    /// Print the names of all objects currently in the target container
    List {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, strict } => {
            let mut config = load_config(config)?;
            config.strict |= strict;
            tracing::info!(command = "sync", "Starting synchronisation process");
            let store = AzureBlobClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to construct blob client from env: {e}"))?;
            sync_with(store, config, &ConsoleReporter::stdout()).await?;
            Ok(())
        }
        Commands::List { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "list", "Listing remote objects");
            let store = AzureBlobClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to construct blob client from env: {e}"))?;
            list_with(store, config, &mut std::io::stdout()).await
        }
    }
}

/// Runs a sync against `store` and applies the exit policy.
pub async fn sync_with<S, R>(store: S, config: SyncConfig, reporter: &R) -> Result<SyncReport>
where
    S: ObjectStore,
    R: Reporter + ?Sized,
{
    let strict = config.strict;
    let reconciler = Reconciler::new(store, config);
    match reconciler.synchronise(reporter).await {
        Ok(report) => {
            let summary = report.summary();
            tracing::info!(command = "sync", ?summary, "Synchronisation complete");
            if strict && report.has_failures() {
                tracing::error!(command = "sync", failures = summary.failures(), "Synchronisation had failures");
                anyhow::bail!(
                    "{} of {} operations failed",
                    summary.failures(),
                    report.uploads.len() + report.deletions.len()
                );
            }
            Ok(report)
        }
        Err(e) => {
            tracing::error!(command = "sync", error = %e, "Synchronisation failed");
            Err(anyhow::Error::new(e))
        }
    }
}

/// Writes every remote object name in the configured container to `out`, one per line.
pub async fn list_with<S, W>(store: S, config: SyncConfig, out: &mut W) -> Result<()>
where
    S: ObjectStore,
    W: Write,
{
    let reconciler = Reconciler::new(store, config);
    let names = reconciler.list_objects().await.map_err(|e| {
        tracing::error!(command = "list", error = %e, "Listing failed");
        anyhow::Error::new(e)
    })?;
    for name in &names {
        writeln!(out, "{name}")?;
    }
    tracing::info!(command = "list", count = names.len(), "Listing complete");
    Ok(())
}
