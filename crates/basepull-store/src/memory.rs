//! In-memory staging store backend
//!
//! Mirrors the MySQL backend's semantics over plain vectors. Serves as the
//! staging fake for pipeline tests, keeping the store contract honest in both
//! directions.

use crate::backend::StagingStore;
use crate::error::{Result, StoreError};
use crate::types::{DownloadStatus, NewRawRecord, NewStagedRecord, RawRecord, StagedRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    raw: Vec<RawRecord>,
    staged: Vec<StagedRecord>,
    next_raw_id: i64,
    next_staged_id: i64,
}

/// In-process staging store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock means a panicking test; propagating the panic is fine.
    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Snapshot of all staged rows, for assertions
    pub fn staged_snapshot(&self) -> Vec<StagedRecord> {
        self.lock().staged.clone()
    }
}

#[async_trait]
impl StagingStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn append_raw(&self, records: &[NewRawRecord]) -> Result<u64> {
        let mut inner = self.lock();
        let pulled_at = Utc::now();

        for record in records {
            inner.next_raw_id += 1;
            let id = inner.next_raw_id;
            inner.raw.push(RawRecord {
                id,
                record_id: record.record_id.clone(),
                project: record.project.clone(),
                fields: record.fields.clone(),
                attachments: record.attachments.clone(),
                submitted_at: record.submitted_at,
                pulled_at,
            });
        }

        Ok(records.len() as u64)
    }

    async fn latest_raw(&self) -> Result<Vec<RawRecord>> {
        let inner = self.lock();

        let mut latest: HashMap<&str, &RawRecord> = HashMap::new();
        for raw in &inner.raw {
            // Vec order follows insertion order, so later wins
            latest.insert(raw.record_id.as_str(), raw);
        }

        let mut records: Vec<RawRecord> = latest.into_values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn raw_count(&self) -> Result<i64> {
        Ok(self.lock().raw.len() as i64)
    }

    async fn staged_count(&self) -> Result<i64> {
        Ok(self.lock().staged.len() as i64)
    }

    async fn get_staged(&self, record_id: &str) -> Result<Option<StagedRecord>> {
        Ok(self
            .lock()
            .staged
            .iter()
            .find(|s| s.record_id == record_id)
            .cloned())
    }

    async fn insert_staged(&self, record: &NewStagedRecord) -> Result<()> {
        let mut inner = self.lock();
        inner.next_staged_id += 1;
        let id = inner.next_staged_id;
        inner.staged.push(StagedRecord {
            id,
            record_id: record.record_id.clone(),
            project: record.project.clone(),
            fields: record.fields.clone(),
            attachments: record.attachments.clone(),
            submitted_at: record.submitted_at,
            status: DownloadStatus::Pending,
            updated_at: Utc::now(),
        });
        Ok(())
    }

    async fn update_staged(&self, record: &NewStagedRecord, reset_status: bool) -> Result<()> {
        let mut inner = self.lock();
        let staged = inner
            .staged
            .iter_mut()
            .find(|s| s.record_id == record.record_id)
            .ok_or_else(|| StoreError::NotFound(record.record_id.clone()))?;

        staged.project = record.project.clone();
        staged.fields = record.fields.clone();
        staged.attachments = record.attachments.clone();
        staged.submitted_at = record.submitted_at;
        if reset_status {
            staged.status = DownloadStatus::Pending;
        }
        staged.updated_at = Utc::now();
        Ok(())
    }

    async fn undownloaded_staged(&self) -> Result<Vec<StagedRecord>> {
        let inner = self.lock();
        let mut records: Vec<StagedRecord> = inner
            .staged
            .iter()
            .filter(|s| s.status != DownloadStatus::Downloaded)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn set_status(&self, record_id: &str, status: DownloadStatus) -> Result<()> {
        let mut inner = self.lock();
        if let Some(staged) = inner.staged.iter_mut().find(|s| s.record_id == record_id) {
            staged.status = status;
            staged.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn prune_superseded_raw(&self) -> Result<u64> {
        let mut inner = self.lock();

        let mut max_ids: HashMap<String, i64> = HashMap::new();
        for raw in &inner.raw {
            let entry = max_ids.entry(raw.record_id.clone()).or_insert(raw.id);
            if raw.id > *entry {
                *entry = raw.id;
            }
        }

        let before = inner.raw.len();
        inner.raw.retain(|r| max_ids.get(&r.record_id) == Some(&r.id));
        Ok((before - inner.raw.len()) as u64)
    }
}
