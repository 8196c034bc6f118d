//! Wire types for the Base-service API
//!
//! All list/auth responses arrive in an envelope carrying an application
//! `code` (0 on success) next to the HTTP status.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Tenant token exchange response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub tenant_access_token: Option<String>,
    /// Seconds until the token expires
    pub expire: Option<i64>,
}

/// Record listing envelope
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<RecordPage>,
}

/// One page of records
#[derive(Debug, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub items: Vec<RecordItem>,
    #[serde(default)]
    pub has_more: bool,
    pub page_token: Option<String>,
}

/// One record as delivered by the service
#[derive(Debug, Deserialize)]
pub struct RecordItem {
    pub record_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// A pulled record with its fields flattened into a mapping
///
/// Semantic interpretation of the fields (which one names the project, which
/// one carries attachments) happens downstream; the client only guarantees a
/// stable external id and the raw field map.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRecord {
    pub record_id: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserializes() {
        let body = serde_json::json!({
            "code": 0,
            "msg": "success",
            "data": {
                "items": [
                    {"record_id": "rec1", "fields": {"project": "alpha"}},
                    {"fields": {"project": "no id"}}
                ],
                "has_more": true,
                "page_token": "pg2"
            }
        });

        let parsed: ListResponse = serde_json::from_value(body).unwrap();
        let page = parsed.data.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.page_token.as_deref(), Some("pg2"));
        assert_eq!(page.items[0].record_id.as_deref(), Some("rec1"));
        assert!(page.items[1].record_id.is_none());
    }

    #[test]
    fn test_list_response_tolerates_missing_data() {
        let parsed: ListResponse =
            serde_json::from_value(serde_json::json!({"code": 1254005, "msg": "TableIdNotFound"}))
                .unwrap();
        assert_eq!(parsed.code, 1254005);
        assert!(parsed.data.is_none());
    }
}
