//! Download stage: staged attachments -> local files
//!
//! Walks the staged rows still waiting for their files (pending or failed),
//! downloads every attachment into a per-record folder, and records the
//! outcome in the staging table. One broken record never stops the run; its
//! row stays failed and is retried on the next pass.

use crate::error::{CliError, Result};
use basepull_client::BaseClient;
use basepull_store::{DownloadStatus, StagedRecord, StagingStore};
use std::path::Path;
use tracing::{debug, info, warn};

/// Summary of one download run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Records whose attachments are all on disk
    pub downloaded: usize,
    /// Records left in the failed state
    pub failed: usize,
    /// Attachment files written this run
    pub files_written: usize,
    /// Attachment files already on disk
    pub files_skipped: usize,
}

/// Run the download stage
pub async fn run(
    client: &BaseClient,
    store: &dyn StagingStore,
    save_root: &Path,
) -> Result<DownloadOutcome> {
    let staged = store.undownloaded_staged().await?;
    info!(records = staged.len(), "records waiting for download");

    let mut outcome = DownloadOutcome::default();
    for record in &staged {
        match download_record(client, record, save_root).await {
            Ok((written, skipped)) => {
                store
                    .set_status(&record.record_id, DownloadStatus::Downloaded)
                    .await?;
                outcome.downloaded += 1;
                outcome.files_written += written;
                outcome.files_skipped += skipped;
            }
            Err(e) => {
                store
                    .set_status(&record.record_id, DownloadStatus::Failed)
                    .await?;
                warn!(
                    record_id = %record.record_id,
                    project = %record.project,
                    error = %e,
                    "record download failed"
                );
                outcome.failed += 1;
            }
        }
    }

    info!(
        downloaded = outcome.downloaded,
        failed = outcome.failed,
        files_written = outcome.files_written,
        files_skipped = outcome.files_skipped,
        "download pass finished"
    );
    Ok(outcome)
}

/// Download every attachment of one staged record
///
/// Returns (files written, files skipped). A file already present and
/// non-empty is never fetched again.
async fn download_record(
    client: &BaseClient,
    record: &StagedRecord,
    save_root: &Path,
) -> Result<(usize, usize)> {
    let dir = save_root.join(record_dir_name(record));
    std::fs::create_dir_all(&dir)?;

    let mut written = 0usize;
    let mut skipped = 0usize;
    for attachment in &record.attachments {
        let path = dir.join(safe_component(&attachment.name));
        if file_present(&path) {
            debug!(path = %path.display(), "attachment already on disk");
            skipped += 1;
            continue;
        }

        let bytes = client.download_media(&attachment.file_token).await?;
        std::fs::write(&path, &bytes)?;
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            sha256 = %basepull_common::checksum::bytes_sha256(&bytes),
            "attachment written"
        );
        written += 1;
    }

    // Final sweep catches anything a concurrent process removed underneath us.
    for attachment in &record.attachments {
        let path = dir.join(safe_component(&attachment.name));
        if !file_present(&path) {
            return Err(CliError::download(format!(
                "attachment missing after download: {}",
                path.display()
            )));
        }
    }

    Ok((written, skipped))
}

fn file_present(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Folder name for a staged record: project plus submission time
pub fn record_dir_name(record: &StagedRecord) -> String {
    let stamp = record.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string();
    format!(
        "{}_{}",
        safe_component(&record.project),
        safe_component(&stamp)
    )
}

/// Replace filesystem-hostile characters with underscores
///
/// Names that would escape or collapse the destination directory (empty,
/// `.`, `..`) come back as a plain underscore.
fn safe_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            other => other,
        })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}
