//! Table reference parsing
//!
//! The service identifies a table by an app token carried in the share URL
//! path (`/base/{app_token}`) and a table id carried in the `table` query
//! parameter. Operators configure the share URL directly; this module pulls
//! the two identifiers out of it.

use crate::error::{ClientError, Result};
use url::Url;

/// Identifies one table within the Base service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub app_token: String,
    pub table_id: String,
}

impl TableRef {
    /// Parse a share URL into an app token and table id
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| ClientError::InvalidTableUrl(format!("{}: {}", raw, e)))?;

        let mut segments = url
            .path_segments()
            .ok_or_else(|| ClientError::InvalidTableUrl(raw.to_string()))?;

        let app_token = segments
            .find(|s| *s == "base")
            .and_then(|_| segments.next())
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or_else(|| ClientError::InvalidTableUrl(raw.to_string()))?
            .to_string();

        let table_id = url
            .query_pairs()
            .find(|(k, _)| k == "table")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ClientError::InvalidTableUrl(raw.to_string()))?;

        Ok(Self { app_token, table_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_url() {
        let table = TableRef::parse(
            "https://example.feishu.cn/base/QBSybMwCZaYLlLsCf7mcUIYmnKg?table=tblgnCSUlKWO3GiE&view=vewxMJqPck",
        )
        .unwrap();
        assert_eq!(table.app_token, "QBSybMwCZaYLlLsCf7mcUIYmnKg");
        assert_eq!(table.table_id, "tblgnCSUlKWO3GiE");
    }

    #[test]
    fn test_parse_missing_table_param() {
        let err = TableRef::parse("https://example.feishu.cn/base/QBSybMw?view=vew").unwrap_err();
        assert!(matches!(err, ClientError::InvalidTableUrl(_)));
    }

    #[test]
    fn test_parse_missing_base_segment() {
        let err = TableRef::parse("https://example.feishu.cn/docs/QBSybMw?table=tbl1").unwrap_err();
        assert!(matches!(err, ClientError::InvalidTableUrl(_)));
    }

    #[test]
    fn test_parse_not_a_url() {
        assert!(TableRef::parse("not a url").is_err());
    }
}
