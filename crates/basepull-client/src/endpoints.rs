//! URL construction for Base-service endpoints

/// Tenant token exchange endpoint
pub fn token_url(base: &str) -> String {
    format!("{}/open-apis/auth/v3/tenant_access_token/internal", base.trim_end_matches('/'))
}

/// Paginated record listing endpoint for one table
pub fn records_url(base: &str, app_token: &str, table_id: &str) -> String {
    format!(
        "{}/open-apis/bitable/v1/apps/{}/tables/{}/records",
        base.trim_end_matches('/'),
        app_token,
        table_id
    )
}

/// Media download endpoint for one file token
pub fn media_url(base: &str, file_token: &str) -> String {
    format!(
        "{}/open-apis/drive/v1/medias/{}/download",
        base.trim_end_matches('/'),
        file_token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("https://open.example.com/"),
            "https://open.example.com/open-apis/auth/v3/tenant_access_token/internal"
        );
    }

    #[test]
    fn test_records_url() {
        assert_eq!(
            records_url("https://open.example.com", "appAbc", "tblXyz"),
            "https://open.example.com/open-apis/bitable/v1/apps/appAbc/tables/tblXyz/records"
        );
    }

    #[test]
    fn test_media_url() {
        assert_eq!(
            media_url("https://open.example.com", "tokJkl"),
            "https://open.example.com/open-apis/drive/v1/medias/tokJkl/download"
        );
    }
}
