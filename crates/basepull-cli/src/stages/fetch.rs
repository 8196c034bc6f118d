//! Fetch stage: source table -> raw_records
//!
//! Pulls every page of the source table, normalizes the flattened field maps
//! into raw rows, and appends them in one transaction. Nothing is written
//! until every page has arrived, so a mid-fetch failure leaves `raw_records`
//! at its prior state.

use crate::config::FieldMap;
use crate::error::Result;
use basepull_client::{BaseClient, BaseRecord, TableRef};
use basepull_store::{Attachment, NewRawRecord, StagingStore};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

/// Summary of one fetch run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Rows appended to raw_records
    pub pulled: usize,
    /// Malformed source rows skipped
    pub skipped: usize,
}

/// Run the fetch stage
pub async fn run(
    client: &BaseClient,
    table: &TableRef,
    fields: &FieldMap,
    store: &dyn StagingStore,
) -> Result<FetchOutcome> {
    let records = client.fetch_all_records(table).await?;

    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        match normalize(record, fields) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    let pulled = store.append_raw(&rows).await? as usize;
    info!(pulled, skipped, "raw records appended");

    Ok(FetchOutcome { pulled, skipped })
}

/// Turn a flattened source record into a raw row
///
/// Rows without a usable project name or without any attachment are
/// malformed: skipped and logged, never fatal to the run.
fn normalize(record: BaseRecord, fields: &FieldMap) -> Option<NewRawRecord> {
    let project = record
        .fields
        .get(&fields.project)
        .and_then(text_value)
        .filter(|s| !s.trim().is_empty());

    let Some(project) = project else {
        warn!(record_id = %record.record_id, "skipping record without a project name");
        return None;
    };

    let attachments = record
        .fields
        .get(&fields.attachments)
        .map(Attachment::parse_list)
        .unwrap_or_default();

    if attachments.is_empty() {
        warn!(record_id = %record.record_id, %project, "skipping record without attachments");
        return None;
    }

    let submitted_at = record
        .fields
        .get(&fields.submitted)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    let fields_json = serde_json::Value::Object(record.fields.into_iter().collect());

    Some(NewRawRecord {
        record_id: record.record_id,
        project,
        fields: fields_json,
        attachments,
        submitted_at,
    })
}

/// Extract a display string from a source field value
///
/// Text fields arrive either as plain strings or as arrays of rich-text
/// segments carrying a `text` member.
fn text_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Array(segments) => {
            let joined: String = segments
                .iter()
                .filter_map(|seg| seg.get("text").and_then(|t| t.as_str()))
                .collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

/// Parse a source timestamp value
///
/// The service delivers timestamps as epoch numbers, in milliseconds for
/// recent dates; values above 1e12 are treated as milliseconds.
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let ts = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };

    let (secs, millis) = if ts > 1e12 {
        ((ts / 1000.0) as i64, (ts as i64 % 1000) as u32)
    } else {
        (ts as i64, 0)
    };

    Utc.timestamp_opt(secs, millis * 1_000_000).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(record_id: &str, fields: serde_json::Value) -> BaseRecord {
        let map: BTreeMap<String, serde_json::Value> =
            serde_json::from_value(fields).unwrap();
        BaseRecord {
            record_id: record_id.to_string(),
            fields: map,
        }
    }

    fn field_map() -> FieldMap {
        FieldMap::default()
    }

    #[test]
    fn normalize_accepts_complete_record() {
        let rec = record(
            "rec1",
            serde_json::json!({
                "project": "alpha",
                "attachments": [{"file_token": "tokA", "name": "a.txt"}],
                "submitted_at": 1735689600000i64,
                "genre": "drama"
            }),
        );

        let row = normalize(rec, &field_map()).unwrap();
        assert_eq!(row.record_id, "rec1");
        assert_eq!(row.project, "alpha");
        assert_eq!(row.attachments.len(), 1);
        assert_eq!(row.submitted_at, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(row.fields["genre"], "drama");
    }

    #[test]
    fn normalize_skips_missing_project_and_attachments() {
        let no_project = record(
            "rec1",
            serde_json::json!({"attachments": [{"file_token": "t", "name": "n"}]}),
        );
        assert!(normalize(no_project, &field_map()).is_none());

        let blank_project = record(
            "rec2",
            serde_json::json!({"project": "  ", "attachments": [{"file_token": "t", "name": "n"}]}),
        );
        assert!(normalize(blank_project, &field_map()).is_none());

        let no_attachments = record("rec3", serde_json::json!({"project": "alpha"}));
        assert!(normalize(no_attachments, &field_map()).is_none());
    }

    #[test]
    fn normalize_reads_rich_text_project() {
        let rec = record(
            "rec1",
            serde_json::json!({
                "project": [{"text": "beta"}, {"text": " show"}],
                "attachments": [{"file_token": "t", "name": "n"}]
            }),
        );
        assert_eq!(normalize(rec, &field_map()).unwrap().project, "beta show");
    }

    #[test]
    fn parse_timestamp_handles_seconds_and_millis() {
        let from_secs = parse_timestamp(&serde_json::json!(1735689600i64)).unwrap();
        let from_millis = parse_timestamp(&serde_json::json!(1735689600000i64)).unwrap();
        assert_eq!(from_secs, from_millis);

        let from_string = parse_timestamp(&serde_json::json!("1735689600")).unwrap();
        assert_eq!(from_string, from_secs);

        assert!(parse_timestamp(&serde_json::json!({"not": "a ts"})).is_none());
        assert!(parse_timestamp(&serde_json::json!("yesterday")).is_none());
    }
}
