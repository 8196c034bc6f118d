//! HTTP client for the Base service
//!
//! Holds the app credentials and the cached tenant token. Page and media
//! requests get bounded retries with a fixed backoff; a 401 drops the cached
//! token so the retry re-authenticates.

use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::table_ref::TableRef;
use crate::types::{BaseRecord, ListResponse, TokenResponse};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

// ============================================================================
// Client Constants
// ============================================================================

/// Default Base-service endpoint root.
pub const DEFAULT_API_URL: &str = "https://open.feishu.cn";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for record listing.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Default attempt budget for one page or media request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// Tokens within this margin of expiry are refreshed proactively.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Token lifetime assumed when the service omits `expire`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 7200;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoint root (overridable for tests)
    pub api_url: String,
    pub app_id: String,
    pub app_secret: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// A bearer token with its expiry instant
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() + Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Session object for the Base service
pub struct BaseClient {
    http: Client,
    config: ClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl BaseClient {
    /// Create a new client with a per-request timeout
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, exchanging credentials if needed
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.is_valid() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange_token().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token after a 401
    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn exchange_token(&self) -> Result<CachedToken> {
        let url = endpoints::token_url(&self.config.api_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "app_id": self.config.app_id,
                "app_secret": self.config.app_secret,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Auth(format!(
                "token endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        if body.code != 0 {
            return Err(ClientError::Auth(format!("code {}: {}", body.code, body.msg)));
        }

        let token = body
            .tenant_access_token
            .ok_or_else(|| ClientError::Auth("response carried no token".to_string()))?;
        let ttl = body.expire.unwrap_or(DEFAULT_TOKEN_TTL_SECS).max(0) as u64;

        debug!(expire_secs = ttl, "obtained tenant access token");

        Ok(CachedToken {
            token,
            expires_at: Instant::now() + Duration::from_secs(ttl),
        })
    }

    /// Fetch one page of records
    ///
    /// Returns the page's records and the cursor for the next page, or `None`
    /// when the service reports no further pages.
    pub async fn fetch_page(
        &self,
        table: &TableRef,
        cursor: Option<&str>,
    ) -> Result<(Vec<BaseRecord>, Option<String>)> {
        self.with_retries("record page", || self.try_fetch_page(table, cursor))
            .await
    }

    async fn try_fetch_page(
        &self,
        table: &TableRef,
        cursor: Option<&str>,
    ) -> Result<(Vec<BaseRecord>, Option<String>)> {
        let token = self.access_token().await?;
        let url = endpoints::records_url(&self.config.api_url, &table.app_token, &table.table_id);

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("page_size", self.config.page_size.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("page_token", cursor)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(ClientError::TokenExpired);
        }
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16(), url });
        }

        let body: ListResponse = response.json().await?;
        if body.code != 0 {
            return Err(ClientError::Api { code: body.code, msg: body.msg });
        }

        let page = body.data.unwrap_or_default();
        let mut records = Vec::with_capacity(page.items.len());
        for item in page.items {
            match item.record_id {
                Some(record_id) if !record_id.is_empty() => {
                    records.push(BaseRecord { record_id, fields: item.fields });
                },
                // Malformed rows are skipped, never fatal to the page
                _ => warn!("skipping record without a record id"),
            }
        }

        let next = if page.has_more { page.page_token } else { None };
        Ok((records, next))
    }

    /// Fetch every page of a table
    pub async fn fetch_all_records(&self, table: &TableRef) -> Result<Vec<BaseRecord>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let (records, next) = self.fetch_page(table, cursor.as_deref()).await?;
            pages += 1;
            debug!(page = pages, count = records.len(), "fetched record page");
            all.extend(records);

            match next {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        info!(records = all.len(), pages, "record fetch complete");
        Ok(all)
    }

    /// Download one attachment by file token
    ///
    /// A zero-byte body is treated as a failed download.
    pub async fn download_media(&self, file_token: &str) -> Result<Vec<u8>> {
        self.with_retries("media download", || self.try_download_media(file_token))
            .await
    }

    async fn try_download_media(&self, file_token: &str) -> Result<Vec<u8>> {
        let token = self.access_token().await?;
        let url = endpoints::media_url(&self.config.api_url, file_token);

        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(ClientError::TokenExpired);
        }
        if !status.is_success() {
            return Err(ClientError::Status { status: status.as_u16(), url });
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ClientError::EmptyDownload(file_token.to_string()));
        }

        Ok(bytes)
    }

    /// Run one request with bounded retries and fixed backoff
    ///
    /// Only transient errors are retried; auth and application errors
    /// propagate immediately.
    async fn with_retries<T, F, Fut>(&self, what: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt = 1u32;

        loop {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(error = %err, attempt, max_attempts, "{what} failed, retrying");
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    attempt += 1;
                },
                Err(err) if err.is_transient() => {
                    return Err(ClientError::RetriesExhausted {
                        attempts: max_attempts,
                        source: Box::new(err),
                    });
                },
                Err(err) => return Err(err),
            }
        }
    }
}
