//! HTTP-level tests for the Base-service client
//!
//! Covers token exchange and caching, 401 refresh, pagination, bounded
//! retries, and media download against a mock server.

use basepull_client::{BaseClient, ClientConfig, ClientError, TableRef};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";
const RECORDS_PATH: &str = "/open-apis/bitable/v1/apps/appTest/tables/tblTest/records";

fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_url: server.uri(),
        app_id: "cli_test_app".to_string(),
        app_secret: "s3cret".to_string(),
        timeout_secs: 5,
        page_size: 100,
        max_retries: 3,
        retry_delay_ms: 1,
    }
}

fn test_table() -> TableRef {
    TableRef {
        app_token: "appTest".to_string(),
        table_id: "tblTest".to_string(),
    }
}

fn token_response() -> serde_json::Value {
    serde_json::json!({
        "code": 0,
        "msg": "ok",
        "tenant_access_token": "t-test-token",
        "expire": 7200
    })
}

/// Build a page body with `count` records starting at `offset`
fn page_body(offset: usize, count: usize, next: Option<&str>) -> serde_json::Value {
    let items: Vec<serde_json::Value> = (offset..offset + count)
        .map(|i| {
            serde_json::json!({
                "record_id": format!("rec{i}"),
                "fields": {"project": format!("proj{i}")}
            })
        })
        .collect();

    serde_json::json!({
        "code": 0,
        "msg": "success",
        "data": {
            "items": items,
            "has_more": next.is_some(),
            "page_token": next
        }
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn auth_exchanges_credentials_and_caches_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(
            serde_json::json!({"app_id": "cli_test_app", "app_secret": "s3cret"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .expect(1) // second fetch must reuse the cached token
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 2, None)))
        .expect(2)
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let table = test_table();

    let (first, _) = client.fetch_page(&table, None).await.unwrap();
    let (second, _) = client.fetch_page(&table, None).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn auth_rejection_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 10003,
            "msg": "invalid app_secret"
        })))
        .expect(1) // no retry on auth failure
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let err = client.fetch_page(&test_table(), None).await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // First record request sees a stale-token 401, the retry succeeds.
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 1, None)))
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let (records, next) = client.fetch_page(&test_table(), None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(next.is_none());
}

#[tokio::test]
async fn fetch_all_paginates_250_records_in_3_pages() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("page_token", "pg2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(100, 100, Some("pg3"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("page_token", "pg3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(200, 50, None)))
        .expect(1)
        .mount(&server)
        .await;
    // No page_token on the first request
    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 100, Some("pg2"))))
        .expect(1)
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let records = client.fetch_all_records(&test_table()).await.unwrap();

    assert_eq!(records.len(), 250);
    assert_eq!(records[0].record_id, "rec0");
    assert_eq!(records[249].record_id, "rec249");
}

#[tokio::test]
async fn malformed_records_are_skipped() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let body = serde_json::json!({
        "code": 0,
        "msg": "success",
        "data": {
            "items": [
                {"record_id": "recA", "fields": {"project": "alpha"}},
                {"fields": {"project": "missing id"}},
                {"record_id": "", "fields": {}},
                {"record_id": "recB", "fields": {}}
            ],
            "has_more": false
        }
    });

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let (records, _) = client.fetch_page(&test_table(), None).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.record_id.as_str()).collect();
    assert_eq!(ids, vec!["recA", "recB"]);
}

#[tokio::test]
async fn server_errors_exhaust_bounded_retries() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // attempt budget
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let err = client.fetch_page(&test_table(), None).await.unwrap_err();
    assert!(
        matches!(err, ClientError::RetriesExhausted { attempts: 3, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn media_download_returns_bytes() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/open-apis/drive/v1/medias/tokA/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"subtitle frames".to_vec()))
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let bytes = client.download_media("tokA").await.unwrap();
    assert_eq!(bytes, b"subtitle frames");
}

#[tokio::test]
async fn zero_byte_media_download_is_an_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/open-apis/drive/v1/medias/tokEmpty/download"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = BaseClient::new(test_config(&server)).unwrap();
    let err = client.download_media("tokEmpty").await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyDownload(token) if token == "tokEmpty"));
}
