//! Staging store trait definition
//!
//! [`StagingStore`] is the storage contract shared by the MySQL backend and
//! the in-memory backend the pipeline tests run against. Model types live in
//! [`crate::types`].

use crate::error::Result;
use crate::types::{DownloadStatus, NewRawRecord, NewStagedRecord, RawRecord, StagedRecord};
use async_trait::async_trait;

/// Storage contract for pulled rows and staged download state.
///
/// Implementations must be `Send + Sync` for use behind `Arc<dyn StagingStore>`.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Create both tables if they do not exist yet.
    async fn ensure_schema(&self) -> Result<()>;

    /// Append one pull's rows as a single transaction.
    ///
    /// All-or-nothing: a failure leaves `raw_records` at its prior state.
    /// Returns the number of rows written.
    async fn append_raw(&self, records: &[NewRawRecord]) -> Result<u64>;

    /// The newest raw row per external id, in pull order.
    async fn latest_raw(&self) -> Result<Vec<RawRecord>>;

    /// Total raw rows, including superseded ones.
    async fn raw_count(&self) -> Result<i64>;

    /// Total staged rows.
    async fn staged_count(&self) -> Result<i64>;

    /// Look up a staged record by external id.
    async fn get_staged(&self, record_id: &str) -> Result<Option<StagedRecord>>;

    /// Insert a new staged record with status `pending`.
    async fn insert_staged(&self, record: &NewStagedRecord) -> Result<()>;

    /// Update a staged record's content.
    ///
    /// With `reset_status` the status returns to `pending` (attachment tokens
    /// changed); without it only metadata moves and the status is untouched.
    async fn update_staged(&self, record: &NewStagedRecord, reset_status: bool) -> Result<()>;

    /// Staged records still owing a download (`pending` or `failed`),
    /// in insertion order. `downloaded` rows are never returned.
    async fn undownloaded_staged(&self) -> Result<Vec<StagedRecord>>;

    /// Flip the download status of one staged record.
    async fn set_status(&self, record_id: &str, status: DownloadStatus) -> Result<()>;

    /// Delete raw rows superseded by a newer pull of the same external id.
    ///
    /// Maintenance only; returns the number of rows removed.
    async fn prune_superseded_raw(&self) -> Result<u64>;
}
