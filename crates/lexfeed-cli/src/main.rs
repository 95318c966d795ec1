use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexfeed_pipeline::{render_crossref_csv, run_batch, IngestConfig};
use lexfeed_store::PgDecisionStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lexfeed")]
#[command(about = "Legal decision ingestion batch job")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest staged decision files into the database.
    Run,
    /// Write the provision/document cross-reference CSV report.
    Report {
        #[arg(long, default_value = "results.csv")]
        output: PathBuf,
        #[arg(long, default_value_t = 1000)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = IngestConfig::from_env();
    let store = PgDecisionStore::connect(&config.database_url)
        .await
        .context("connecting to the decision database")?;

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            if let Some(bucket) = &config.archive_bucket {
                info!(
                    bucket,
                    prefix = config.archive_prefix.as_deref().unwrap_or(""),
                    staging = %config.staging_dir.display(),
                    "staging directory is fed by the external archive retrieval job"
                );
            }
            run_batch(&config, &store).await.map(|summary| {
                println!(
                    "batch complete: listed={} ingested={} quarantined={} failed={} deleted={} purged={}",
                    summary.listed,
                    summary.ingested,
                    summary.quarantined,
                    summary.failed,
                    summary.deleted,
                    summary.purged
                );
            })
        }
        Commands::Report { output, limit } => {
            report(&store, &output, limit).await
        }
    };

    // The connection is released on every exit path, success or failure.
    store.close().await;
    result
}

async fn report(store: &PgDecisionStore, output: &PathBuf, limit: i64) -> Result<()> {
    let counts = store
        .provision_document_counts(limit)
        .await
        .context("querying provision/document cross-reference counts")?;
    let csv = render_crossref_csv(&counts);
    tokio::fs::write(output, csv)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("report complete: provisions={} output={}", counts.len(), output.display());
    Ok(())
}
