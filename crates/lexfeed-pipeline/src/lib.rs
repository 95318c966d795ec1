//! Batch ingestion pipeline: staged decision JSON files into Postgres.
//!
//! The staging directory is filled by the upstream archive-retrieval job
//! (object store listing + ZIP extraction), which deposits one flattened
//! JSON document per decision. This crate walks that directory, matches each
//! document to its pre-existing decision row and fans the nested collections
//! out into the child tables, quarantining files that cannot be matched or
//! written.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, error, info, warn};

use lexfeed_core::{DecisionDocument, DecisionRecord};
use lexfeed_store::{DecisionStore, DecisionWriter, ProvisionDocumentCount};

pub const CRATE_NAME: &str = "lexfeed-pipeline";

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database_url: String,
    pub staging_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub delete_on_success: bool,
    pub delete_on_failure: bool,
    pub purge_staging: bool,
    pub archive_bucket: Option<String>,
    pub archive_prefix: Option<String>,
}

impl IngestConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: database_url_from_env(),
            staging_dir: std::env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./imported_files")),
            quarantine_dir: std::env::var("QUARANTINE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./errors")),
            delete_on_success: env_flag("LEXFEED_DELETE_ON_SUCCESS"),
            delete_on_failure: env_flag("LEXFEED_DELETE_ON_FAILURE"),
            purge_staging: env_flag("LEXFEED_PURGE_STAGING"),
            archive_bucket: std::env::var("ARCHIVE_BUCKET").ok(),
            archive_prefix: std::env::var("ARCHIVE_PREFIX").ok(),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}

/// `DATABASE_URL` wins; otherwise compose the URL from the `PG*` variables
/// the deployment environment exports.
fn database_url_from_env() -> String {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return url;
    }
    let host = std::env::var("PGHOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("PGPORT").unwrap_or_else(|_| "5433".to_string());
    let database = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "postgres".to_string());
    let user = std::env::var("PGUSER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("PGPASSWORD").unwrap_or_default();
    format!("postgres://{user}:{password}@{host}:{port}/{database}")
}

/// Terminal state of one staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Ingested { decision_id: i64 },
    /// The document could not be matched to a decision row; the file was
    /// copied into quarantine and no child write took place.
    Quarantined,
}

/// Copy a staged file into the quarantine directory, creating it on demand.
/// The copy is byte-for-byte so the file can be resubmitted as-is.
pub async fn quarantine_copy(source: &Path, quarantine_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(quarantine_dir)
        .await
        .with_context(|| format!("creating quarantine directory {}", quarantine_dir.display()))?;
    let file_name = source
        .file_name()
        .with_context(|| format!("staged path {} has no file name", source.display()))?;
    let target = quarantine_dir.join(file_name);
    fs::copy(source, &target)
        .await
        .with_context(|| format!("copying {} into quarantine", source.display()))?;
    Ok(target)
}

/// Ingest one staged file.
///
/// Reads and parses the document, resolves its external identifier, then
/// issues every write inside a single transaction in fixed order: header
/// update, requests, arguments, parties, cited decisions, cited provisions,
/// the extracted-references sidecar, provision citation groups with their
/// dependent citation rows, legal teachings, teaching citation groups with
/// theirs. Each await completes before the next begins; a citation row is
/// never issued before its group insert has returned the generated id.
///
/// An unresolved external id is an expected outcome: the file is copied to
/// quarantine and `Quarantined` is returned without error. Parse and storage
/// failures propagate to the caller with the transaction rolled back; the
/// batch runner owns quarantining those.
pub async fn process_file(
    path: &Path,
    store: &dyn DecisionStore,
    quarantine_dir: &Path,
) -> Result<FileOutcome> {
    info!(file = %path.display(), "processing staged file");

    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let document: DecisionDocument =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let record = DecisionRecord::from_document(document);

    let Some(decision_id) = store.find_decision(&record.external_id).await? else {
        info!(
            external_id = %record.external_id,
            file = %path.display(),
            "decision not present in store, quarantining"
        );
        quarantine_copy(path, quarantine_dir).await?;
        return Ok(FileOutcome::Quarantined);
    };
    debug!(external_id = %record.external_id, decision_id, "decision resolved");

    let mut writer = store.begin_file().await?;

    if !writer.update_decision(decision_id, &record.header).await? {
        // The row vanished between resolve and update; same treatment as
        // not-found. Dropping the writer rolls the transaction back.
        warn!(decision_id, "header update affected no rows, quarantining");
        drop(writer);
        quarantine_copy(path, quarantine_dir).await?;
        return Ok(FileOutcome::Quarantined);
    }

    for request in &record.requests {
        note_rows(
            "decision_requests",
            decision_id,
            writer.insert_request(decision_id, request).await?,
        );
    }
    for argument in &record.arguments {
        note_rows(
            "decision_arguments",
            decision_id,
            writer.insert_argument(decision_id, argument).await?,
        );
    }
    for party in &record.parties {
        note_rows(
            "decision_parties",
            decision_id,
            writer.insert_party(decision_id, party).await?,
        );
    }
    for cited in &record.cited_decisions {
        note_rows(
            "cited_decisions",
            decision_id,
            writer.insert_cited_decision(decision_id, cited).await?,
        );
    }
    for provision in &record.cited_provisions {
        note_rows(
            "decision_cited_provisions",
            decision_id,
            writer.insert_cited_provision(decision_id, provision).await?,
        );
    }
    note_rows(
        "decision_extracted_references",
        decision_id,
        writer
            .insert_extracted_references(decision_id, &record.extracted_references)
            .await?,
    );

    for group in &record.provision_citation_groups {
        let group_id = writer.insert_provision_citation_group(decision_id, group).await?;
        for citation in &group.citations {
            note_rows(
                "decision_related_citations_citations",
                decision_id,
                writer.insert_provision_citation(decision_id, group_id, citation).await?,
            );
        }
    }

    for teaching in &record.legal_teachings {
        note_rows(
            "decision_legal_teachings",
            decision_id,
            writer.insert_legal_teaching(decision_id, teaching).await?,
        );
    }

    for group in &record.teaching_citation_groups {
        let group_id = writer
            .insert_teaching_citation_group(decision_id, group.teaching_id.as_deref())
            .await?;
        for citation in &group.citations {
            note_rows(
                "decision_related_citations_legal_teachings_citations",
                decision_id,
                writer.insert_teaching_citation(decision_id, group_id, citation).await?,
            );
        }
    }

    writer.commit().await?;
    info!(decision_id, file = %path.display(), "file ingested");
    Ok(FileOutcome::Ingested { decision_id })
}

fn note_rows(table: &str, decision_id: i64, inserted: bool) {
    if !inserted {
        debug!(table, decision_id, "write affected no rows");
    }
}

/// True for the flattened data files the runner should pick up: a `.json`
/// suffix, not hidden, not a `._` resource fork left behind by archive
/// extraction.
pub fn is_staged_data_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.') && name.ends_with(".json")
}

fn list_staged_files(staging_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(staging_dir)
        .with_context(|| format!("reading staging directory {}", staging_dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| is_staged_data_file(path))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub listed: usize,
    pub ingested: usize,
    pub quarantined: usize,
    pub failed: usize,
    pub deleted: usize,
    pub purged: usize,
}

/// Run one batch over the staging directory, strictly sequentially, with
/// failures isolated per file: a file that cannot be parsed or written is
/// logged, copied to quarantine and skipped, and the batch continues.
///
/// Re-running a batch over the same files duplicates child rows; at-most-once
/// delivery of each source file is an operational requirement, not something
/// this runner enforces.
pub async fn run_batch(config: &IngestConfig, store: &dyn DecisionStore) -> Result<BatchSummary> {
    let files = list_staged_files(&config.staging_dir)?;
    let mut summary = BatchSummary::default();

    for path in files {
        summary.listed += 1;
        let delete_source = match process_file(&path, store, &config.quarantine_dir).await {
            Ok(FileOutcome::Ingested { .. }) => {
                summary.ingested += 1;
                config.delete_on_success
            }
            Ok(FileOutcome::Quarantined) => {
                summary.quarantined += 1;
                config.delete_on_failure
            }
            Err(err) => {
                error!(file = %path.display(), error = ?err, "file failed, continuing batch");
                summary.failed += 1;
                if let Err(copy_err) = quarantine_copy(&path, &config.quarantine_dir).await {
                    error!(file = %path.display(), error = ?copy_err, "quarantine copy failed");
                }
                config.delete_on_failure
            }
        };

        if delete_source {
            match fs::remove_file(&path).await {
                Ok(()) => summary.deleted += 1,
                Err(err) => {
                    error!(file = %path.display(), error = %err, "deleting source file failed")
                }
            }
        }
    }

    if config.purge_staging {
        summary.purged = purge_directory(&config.staging_dir).await?;
    }

    info!(
        listed = summary.listed,
        ingested = summary.ingested,
        quarantined = summary.quarantined,
        failed = summary.failed,
        deleted = summary.deleted,
        purged = summary.purged,
        "batch complete"
    );
    Ok(summary)
}

/// Remove every remaining file in the directory, whatever its state. The
/// blunt end-of-batch cleanup behind `LEXFEED_PURGE_STAGING`.
async fn purge_directory(dir: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading {} for purge", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();

    let mut purged = 0;
    for path in entries {
        match fs::remove_file(&path).await {
            Ok(()) => purged += 1,
            Err(err) => error!(file = %path.display(), error = %err, "purge failed for file"),
        }
    }
    Ok(purged)
}

/// Render the provision/document cross-reference counts as the CSV the
/// original reporting job emitted.
pub fn render_crossref_csv(counts: &[ProvisionDocumentCount]) -> String {
    let mut out = String::from("id,document_count\n");
    for count in counts {
        out.push_str(&format!("{},{}\n", count.provision_id, count.document_count));
    }
    out
}
