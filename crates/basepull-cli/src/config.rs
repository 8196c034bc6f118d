//! Configuration management for the basepull CLI
//!
//! Everything is resolved from environment variables (a `.env` file is
//! honored via dotenvy). Credentials and the table URL have no defaults and
//! must be set; connection and paging knobs fall back to the constants below.

use crate::error::{CliError, Result};
use basepull_client::client::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default database host.
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";

/// Default database port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default database user.
pub const DEFAULT_DB_USER: &str = "basepull";

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "basepull";

/// Default root directory for downloaded attachments.
pub const DEFAULT_SAVE_ROOT: &str = "/var/lib/basepull";

/// Default source field carrying the project name.
pub const DEFAULT_PROJECT_FIELD: &str = "project";

/// Default source field carrying the attachment list.
pub const DEFAULT_ATTACHMENT_FIELD: &str = "attachments";

/// Default source field carrying the submission timestamp.
pub const DEFAULT_SUBMITTED_FIELD: &str = "submitted_at";

/// Which source fields carry the project name, attachments, and timestamp
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub project: String,
    pub attachments: String,
    pub submitted: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT_FIELD.to_string(),
            attachments: DEFAULT_ATTACHMENT_FIELD.to_string(),
            submitted: DEFAULT_SUBMITTED_FIELD.to_string(),
        }
    }
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MySQL connection URL for the staging store
    pub database_url: String,

    /// Base-service client settings (credentials, endpoint, retry bounds)
    pub client: ClientConfig,

    /// Share URL of the source table
    pub table_url: String,

    /// Source field names
    pub fields: FieldMap,

    /// Root directory for downloaded attachments
    pub save_root: PathBuf,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// Required: `BASEPULL_APP_ID`, `BASEPULL_APP_SECRET`, `BASEPULL_TABLE_URL`.
    /// The database URL comes from `BASEPULL_DATABASE_URL` when set, otherwise
    /// it is assembled from `BASEPULL_DB_HOST`, `BASEPULL_DB_PORT`,
    /// `BASEPULL_DB_USER`, `BASEPULL_DB_PASSWORD`, `BASEPULL_DB_NAME`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = match std::env::var("BASEPULL_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "mysql://{}:{}@{}:{}/{}",
                env_or("BASEPULL_DB_USER", DEFAULT_DB_USER),
                std::env::var("BASEPULL_DB_PASSWORD").unwrap_or_default(),
                env_or("BASEPULL_DB_HOST", DEFAULT_DB_HOST),
                env_parse("BASEPULL_DB_PORT", DEFAULT_DB_PORT),
                env_or("BASEPULL_DB_NAME", DEFAULT_DB_NAME),
            ),
        };

        let client = ClientConfig {
            api_url: env_or("BASEPULL_API_URL", DEFAULT_API_URL),
            app_id: require("BASEPULL_APP_ID")?,
            app_secret: require("BASEPULL_APP_SECRET")?,
            timeout_secs: env_parse("BASEPULL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            page_size: env_parse("BASEPULL_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_retries: env_parse("BASEPULL_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            retry_delay_ms: env_parse("BASEPULL_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS),
        };

        let fields = FieldMap {
            project: env_or("BASEPULL_PROJECT_FIELD", DEFAULT_PROJECT_FIELD),
            attachments: env_or("BASEPULL_ATTACHMENT_FIELD", DEFAULT_ATTACHMENT_FIELD),
            submitted: env_or("BASEPULL_SUBMITTED_FIELD", DEFAULT_SUBMITTED_FIELD),
        };

        Ok(Self {
            database_url,
            client,
            table_url: require("BASEPULL_TABLE_URL")?,
            fields,
            save_root: PathBuf::from(env_or("BASEPULL_SAVE_ROOT", DEFAULT_SAVE_ROOT)),
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CliError::config(format!("{key} must be set")))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Env-var manipulation is process-global, so everything lives in one test.
    #[test]
    fn test_load_from_env() {
        std::env::set_var("BASEPULL_APP_ID", "cli_abc");
        std::env::set_var("BASEPULL_APP_SECRET", "shh");
        std::env::set_var("BASEPULL_TABLE_URL", "https://x.example.com/base/appX?table=tblY");
        std::env::set_var("BASEPULL_DB_PASSWORD", "pw");
        std::env::set_var("BASEPULL_PAGE_SIZE", "100");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.client.app_id, "cli_abc");
        assert_eq!(config.client.page_size, 100);
        assert_eq!(config.client.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.database_url,
            "mysql://basepull:pw@127.0.0.1:3306/basepull"
        );
        assert_eq!(config.save_root, PathBuf::from(DEFAULT_SAVE_ROOT));
        assert_eq!(config.fields.project, "project");

        std::env::set_var("BASEPULL_DATABASE_URL", "mysql://u:p@db.internal:3307/mirror");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.database_url, "mysql://u:p@db.internal:3307/mirror");

        std::env::remove_var("BASEPULL_APP_ID");
        let err = AppConfig::load().unwrap_err();
        assert!(err.to_string().contains("BASEPULL_APP_ID"));

        std::env::remove_var("BASEPULL_APP_SECRET");
        std::env::remove_var("BASEPULL_TABLE_URL");
        std::env::remove_var("BASEPULL_DB_PASSWORD");
        std::env::remove_var("BASEPULL_PAGE_SIZE");
        std::env::remove_var("BASEPULL_DATABASE_URL");
    }
}
