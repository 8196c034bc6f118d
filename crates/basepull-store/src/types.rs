//! Domain types for the staging store

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// An attachment reference carried by a source record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_token: String,
    pub name: String,
}

impl Attachment {
    /// Parse an attachment field value into a list of attachments
    ///
    /// The source delivers attachment fields as a JSON array of objects.
    /// Entries missing their token or name are skipped and logged, matching
    /// the skip-and-log policy for malformed rows.
    pub fn parse_list(value: &serde_json::Value) -> Vec<Attachment> {
        let items: &[serde_json::Value] = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(_) => std::slice::from_ref(value),
            _ => return Vec::new(),
        };

        let mut attachments = Vec::with_capacity(items.len());
        for item in items {
            let file_token = item.get("file_token").and_then(|v| v.as_str());
            let name = item.get("name").and_then(|v| v.as_str());
            match (file_token, name) {
                (Some(token), Some(name)) if !token.is_empty() && !name.is_empty() => {
                    attachments.push(Attachment {
                        file_token: token.to_string(),
                        name: name.to_string(),
                    });
                },
                _ => warn!(entry = %item, "skipping attachment entry without token or name"),
            }
        }
        attachments
    }
}

/// Compare two attachment lists by their token sets
///
/// A token-set change is the trigger for a re-download; renames with the same
/// tokens are metadata-only.
pub fn tokens_differ(a: &[Attachment], b: &[Attachment]) -> bool {
    let left: BTreeSet<&str> = a.iter().map(|att| att.file_token.as_str()).collect();
    let right: BTreeSet<&str> = b.iter().map(|att| att.file_token.as_str()).collect();
    left != right
}

/// Download status of a staged record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloaded,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Downloaded => "downloaded",
            DownloadStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for DownloadStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DownloadStatus::Pending),
            "downloaded" => Ok(DownloadStatus::Downloaded),
            "failed" => Ok(DownloadStatus::Failed),
            other => Err(StoreError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input row for one pull of the source table
#[derive(Debug, Clone, PartialEq)]
pub struct NewRawRecord {
    pub record_id: String,
    pub project: String,
    pub fields: serde_json::Value,
    pub attachments: Vec<Attachment>,
    pub submitted_at: DateTime<Utc>,
}

/// A pulled row as stored, never mutated after insert
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: i64,
    pub record_id: String,
    pub project: String,
    pub fields: serde_json::Value,
    pub attachments: Vec<Attachment>,
    pub submitted_at: DateTime<Utc>,
    pub pulled_at: DateTime<Utc>,
}

/// Input for inserting or updating a staged record
#[derive(Debug, Clone, PartialEq)]
pub struct NewStagedRecord {
    pub record_id: String,
    pub project: String,
    pub fields: serde_json::Value,
    pub attachments: Vec<Attachment>,
    pub submitted_at: DateTime<Utc>,
}

impl From<&RawRecord> for NewStagedRecord {
    fn from(raw: &RawRecord) -> Self {
        Self {
            record_id: raw.record_id.clone(),
            project: raw.project.clone(),
            fields: raw.fields.clone(),
            attachments: raw.attachments.clone(),
            submitted_at: raw.submitted_at,
        }
    }
}

/// The deduplicated, status-tracked row downloads are driven from
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRecord {
    /// Insertion-order key
    pub id: i64,
    pub record_id: String,
    pub project: String,
    pub fields: serde_json::Value,
    pub attachments: Vec<Attachment>,
    pub submitted_at: DateTime<Utc>,
    pub status: DownloadStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DownloadStatus::Pending,
            DownloadStatus::Downloaded,
            DownloadStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<DownloadStatus>().unwrap(), status);
        }
        assert!("done".parse::<DownloadStatus>().is_err());
    }

    #[test]
    fn test_parse_attachment_list() {
        let value = serde_json::json!([
            {"file_token": "tokA", "name": "subtitles.txt", "size": 120},
            {"file_token": "", "name": "empty-token.txt"},
            {"name": "no-token.txt"},
            {"file_token": "tokB", "name": "prompts.txt"}
        ]);

        let attachments = Attachment::parse_list(&value);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].file_token, "tokA");
        assert_eq!(attachments[1].name, "prompts.txt");
    }

    #[test]
    fn test_parse_attachment_single_object() {
        let value = serde_json::json!({"file_token": "tokC", "name": "single.txt"});
        let attachments = Attachment::parse_list(&value);
        assert_eq!(attachments.len(), 1);
    }

    #[test]
    fn test_parse_attachment_non_list() {
        assert!(Attachment::parse_list(&serde_json::json!("plain text")).is_empty());
        assert!(Attachment::parse_list(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_tokens_differ_ignores_order_and_names() {
        let a = vec![
            Attachment { file_token: "t1".into(), name: "a.txt".into() },
            Attachment { file_token: "t2".into(), name: "b.txt".into() },
        ];
        let b = vec![
            Attachment { file_token: "t2".into(), name: "renamed.txt".into() },
            Attachment { file_token: "t1".into(), name: "a.txt".into() },
        ];
        let c = vec![Attachment { file_token: "t3".into(), name: "a.txt".into() }];

        assert!(!tokens_differ(&a, &b));
        assert!(tokens_differ(&a, &c));
    }
}
