//! Sync stage: raw_records -> staged_records
//!
//! Diffs the latest raw snapshot of every record against the staging table.
//! A changed attachment token set is the only thing that flags a row for
//! re-download; any other field change is a metadata refresh that leaves the
//! download status alone.

use crate::error::Result;
use basepull_store::{tokens_differ, NewStagedRecord, StagingStore};
use tracing::{debug, info};

/// Summary of one sync run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// New records staged for download
    pub inserted: usize,
    /// Records whose attachments changed, reset to pending
    pub reset: usize,
    /// Records with metadata-only changes
    pub refreshed: usize,
    /// Records already up to date
    pub unchanged: usize,
}

/// Run the sync stage
pub async fn run(store: &dyn StagingStore) -> Result<SyncOutcome> {
    let latest = store.latest_raw().await?;

    let mut outcome = SyncOutcome::default();
    for raw in &latest {
        let incoming = NewStagedRecord::from(raw);
        match store.get_staged(&raw.record_id).await? {
            None => {
                store.insert_staged(&incoming).await?;
                debug!(record_id = %raw.record_id, project = %raw.project, "staged new record");
                outcome.inserted += 1;
            }
            Some(existing) => {
                if tokens_differ(&existing.attachments, &incoming.attachments) {
                    store.update_staged(&incoming, true).await?;
                    info!(
                        record_id = %raw.record_id,
                        project = %raw.project,
                        "attachments changed, record reset for re-download"
                    );
                    outcome.reset += 1;
                } else if existing.project != incoming.project
                    || existing.fields != incoming.fields
                    || existing.submitted_at != incoming.submitted_at
                    || existing.attachments != incoming.attachments
                {
                    store.update_staged(&incoming, false).await?;
                    outcome.refreshed += 1;
                } else {
                    outcome.unchanged += 1;
                }
            }
        }
    }

    info!(
        inserted = outcome.inserted,
        reset = outcome.reset,
        refreshed = outcome.refreshed,
        unchanged = outcome.unchanged,
        "staging table synced"
    );
    Ok(outcome)
}
