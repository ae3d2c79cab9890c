//! Integration tests for the SolarWinds Observability client.
//!
//! These tests verify the HTTP behavior of the REST client and the archive
//! download path against wiremock servers: authentication headers, query
//! construction, per-operation 404 handling, and the zero-header contract
//! of pre-signed archive downloads.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use swo_mcp::clients::archive::download_and_unzip_archive;
use swo_mcp::clients::swo::{AlertSeverity, LogSearch, NewAlert};
use swo_mcp::clients::{SwoClient, SwoConfig, SwoError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Test fixture providing a mock API server and a client wired to it.
struct TestFixture {
    /// Mock API server.
    server: MockServer,
    /// Client configured against the mock server.
    client: SwoClient,
}

impl TestFixture {
    /// Create a new test fixture with a mock server.
    async fn new() -> Self {
        let server = MockServer::start().await;
        let config = SwoConfig::new("test-token").with_api_url(server.uri());
        let client = SwoClient::new(config);

        Self { server, client }
    }
}

/// Matcher asserting that a header is absent from the request.
///
/// Pre-signed URLs embed their authentication in the query string; the
/// archive fetch must not carry any of the REST client's headers.
struct NoHeader(&'static str);

impl Match for NoHeader {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .iter()
            .all(|(name, _)| !name.as_str().eq_ignore_ascii_case(self.0))
    }
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

// =============================================================================
// Entities
// =============================================================================

#[tokio::test]
async fn test_get_entities_sends_bearer_and_parses_list() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/entities"))
        .and(query_param("type", "host"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entities": [
                {"id": "e-1", "type": "host", "name": "web-1", "status": "healthy"},
                {"id": "e-2", "type": "host", "name": "web-2", "status": "critical"}
            ]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let entities = fixture
        .client
        .get_entities(Some(swo_mcp::clients::EntityType::Host))
        .await
        .expect("Should list entities");

    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].id, "e-1");
    assert_eq!(entities[1].name, "web-2");
}

#[tokio::test]
async fn test_get_entities_empty_body_degrades_to_empty_list() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&fixture.server)
        .await;

    let entities = fixture
        .client
        .get_entities(None)
        .await
        .expect("Should tolerate a missing entities field");
    assert!(entities.is_empty());
}

#[tokio::test]
async fn test_get_entity_not_found() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/entities/e-missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;

    let result = fixture.client.get_entity("e-missing").await;
    assert!(matches!(result, Err(SwoError::EntityNotFound(id)) if id == "e-missing"));
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_get_metrics_reshapes_upstream_fields() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/metrics"))
        .and(query_param("entityId", "e-1"))
        .and(query_param("names", "cpu.utilization,memory.used"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "metricsInfo": [
                {
                    "name": "cpu.utilization",
                    "value": 42.5,
                    "lastReportedTime": "2024-03-01T12:00:00Z",
                    "tags": {"core": "0"}
                },
                {
                    "name": "memory.used",
                    "lastReportedTime": "2024-03-01T12:00:00Z"
                }
            ]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let names = vec!["cpu.utilization".to_string(), "memory.used".to_string()];
    let metrics = fixture
        .client
        .get_metrics(Some("e-1"), Some(&names), None)
        .await
        .expect("Should fetch metrics");

    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].value, 42.5);
    assert_eq!(metrics[0].tags["core"], "0");
    // Absent value defaults to zero.
    assert_eq!(metrics[1].value, 0.0);
    assert!(metrics[1].tags.is_empty());
}

// =============================================================================
// Alerts: reads degrade on 404, writes fail explicitly
// =============================================================================

#[tokio::test]
async fn test_get_alerts_degrades_to_empty_on_404() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;

    let alerts = fixture
        .client
        .get_alerts(Some(true))
        .await
        .expect("404 should degrade to an empty list");
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_create_alert_fails_explicitly_on_404() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/alerts"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;

    let alert = NewAlert {
        name: "High CPU".to_string(),
        description: None,
        condition: "cpu.utilization > 90".to_string(),
        severity: AlertSeverity::Critical,
        enabled: true,
    };

    let result = fixture.client.create_alert(&alert).await;
    let error = result.expect_err("A write must not silently no-op");
    assert_eq!(
        error.to_string(),
        "Alert creation not supported in current API"
    );
}

#[tokio::test]
async fn test_create_alert_success() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/alerts"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "al-1",
            "name": "High CPU",
            "condition": "cpu.utilization > 90",
            "severity": "critical",
            "enabled": true
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let alert = NewAlert {
        name: "High CPU".to_string(),
        description: None,
        condition: "cpu.utilization > 90".to_string(),
        severity: AlertSeverity::Critical,
        enabled: true,
    };

    let created = fixture
        .client
        .create_alert(&alert)
        .await
        .expect("Should create alert");
    assert_eq!(created.id, "al-1");
}

#[tokio::test]
async fn test_delete_alert() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/alerts/al-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.server)
        .await;

    fixture
        .client
        .delete_alert("al-1")
        .await
        .expect("Should delete alert");
}

// =============================================================================
// Traces
// =============================================================================

#[tokio::test]
async fn test_get_traces_degrades_to_empty_on_404() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/traces"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;

    let traces = fixture
        .client
        .get_traces(None, None)
        .await
        .expect("404 should degrade to an empty list");
    assert!(traces.is_empty());
}

#[tokio::test]
async fn test_get_trace_not_found_is_a_hard_failure() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/traces/t-missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fixture.server)
        .await;

    let result = fixture.client.get_trace("t-missing").await;
    assert!(matches!(result, Err(SwoError::TraceNotFound(id)) if id == "t-missing"));
}

#[tokio::test]
async fn test_get_trace_parses_spans() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/traces/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "spans": [
                {
                    "traceId": "t-1",
                    "spanId": "s-1",
                    "operationName": "GET /checkout",
                    "serviceName": "storefront",
                    "duration": 12.5,
                    "startTime": "2024-03-01T12:00:00Z"
                },
                {
                    "traceId": "t-1",
                    "spanId": "s-2",
                    "parentSpanId": "s-1",
                    "operationName": "SELECT orders",
                    "serviceName": "orders-db",
                    "duration": 4.2,
                    "startTime": "2024-03-01T12:00:00.003Z"
                }
            ]
        })))
        .mount(&fixture.server)
        .await;

    let spans = fixture
        .client
        .get_trace("t-1")
        .await
        .expect("Should fetch trace spans");

    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].parent_span_id.as_deref(), Some("s-1"));
}

// =============================================================================
// Log search
// =============================================================================

#[tokio::test]
async fn test_search_logs_filter_construction() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/logs"))
        .and(query_param("filter", "(group:a OR group:b) AND x"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "logs": []
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let search = LogSearch {
        query: Some("x".to_string()),
        groups: vec!["a".to_string(), "b".to_string()],
        ..Default::default()
    };

    let logs = fixture
        .client
        .search_logs(&search)
        .await
        .expect("Should search logs");
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_search_logs_reslices_upstream_overreturn() {
    let fixture = TestFixture::new().await;

    // Upstream ignores the limit parameter and returns more rows.
    let rows: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({
                "time": "2024-03-01T12:00:00.000Z",
                "severity": "INFO",
                "message": format!("row {}", i),
                "hostname": "web-1"
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/logs"))
        .and(query_param("limit", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "logs": rows })),
        )
        .mount(&fixture.server)
        .await;

    let search = LogSearch {
        limit: Some(3),
        ..Default::default()
    };

    let logs = fixture
        .client
        .search_logs(&search)
        .await
        .expect("Should search logs");

    assert_eq!(logs.len(), 3);
    assert_eq!(logs[2].message, "row 2");
}

#[tokio::test]
async fn test_search_logs_accepts_bare_array_response() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"time": "2024-03-01T12:00:00.000Z", "severity": "WARN", "message": "m", "hostname": "h"}
        ])))
        .mount(&fixture.server)
        .await;

    let logs = fixture
        .client
        .search_logs(&LogSearch::default())
        .await
        .expect("Should search logs");

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, "warn");
}

// =============================================================================
// Log archives
// =============================================================================

#[tokio::test]
async fn test_list_log_archives() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/logs/archives"))
        .and(query_param("startTime", "2024-03-01T00:00:00.000Z"))
        .and(query_param("endTime", "2024-03-02T00:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "logArchives": [
                {
                    "id": "arch-1",
                    "name": "logs-2024-03-01T12.json.gz",
                    "downloadUrl": "https://bucket.s3.example.com/logs?sig=abc",
                    "archivedTimestamp": "1709294400",
                    "archiveSize": 2097152
                }
            ]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let start = "2024-03-01T00:00:00Z".parse().unwrap();
    let end = "2024-03-02T00:00:00Z".parse().unwrap();
    let archives = fixture
        .client
        .list_log_archives(start, end)
        .await
        .expect("Should list archives");

    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].archive_size, 2_097_152);
    assert_eq!(archives[0].archived_timestamp, "1709294400");
}

#[tokio::test]
async fn test_archive_download_sends_no_client_headers() {
    let server = MockServer::start().await;

    let body = (0..4)
        .map(|i| {
            format!(
                r#"{{"time":"2024-03-01T12:00:00.000Z","severity":"INFO","message":"entry {}","hostname":"web-1"}}"#,
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Mock::given(method("GET"))
        .and(path("/archive.json.gz"))
        .and(query_param("sig", "abc"))
        .and(NoHeader("authorization"))
        .and(NoHeader("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(&body)))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/archive.json.gz?sig=abc", server.uri());
    let entries = download_and_unzip_archive(&url, None)
        .await
        .expect("Should download and parse the archive");

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].message, "entry 0");
    assert_eq!(entries[0].source, "web-1");
}

#[tokio::test]
async fn test_archive_download_skips_malformed_lines() {
    let server = MockServer::start().await;

    let body = concat!(
        r#"{"time":"2024-03-01T12:00:00.000Z","severity":"INFO","message":"ok 1","hostname":"h"}"#,
        "\n",
        "{this line is not json",
        "\n",
        r#"{"time":"2024-03-01T12:01:00.000Z","severity":"ERROR","message":"ok 2","hostname":"h"}"#,
    );

    Mock::given(method("GET"))
        .and(path("/archive.json.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(body)))
        .mount(&server)
        .await;

    let url = format!("{}/archive.json.gz", server.uri());
    let entries = download_and_unzip_archive(&url, None)
        .await
        .expect("A malformed line must not abort the batch");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].level, "error");
}

#[tokio::test]
async fn test_archive_download_respects_limit() {
    let server = MockServer::start().await;

    let body = (0..100)
        .map(|i| format!(r#"{{"message":"entry {}","hostname":"h"}}"#, i))
        .collect::<Vec<_>>()
        .join("\n");

    Mock::given(method("GET"))
        .and(path("/archive.json.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(&body)))
        .mount(&server)
        .await;

    let url = format!("{}/archive.json.gz", server.uri());
    let entries = download_and_unzip_archive(&url, Some(5))
        .await
        .expect("Should download and parse the archive");

    assert_eq!(entries.len(), 5);
}

#[tokio::test]
async fn test_archive_download_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/archive.json.gz"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/archive.json.gz", server.uri());
    let result = download_and_unzip_archive(&url, None).await;
    assert!(matches!(result, Err(SwoError::ArchiveDownload(_))));
}

// =============================================================================
// Connection probe
// =============================================================================

#[tokio::test]
async fn test_connection_probe() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/entities"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entities": []
        })))
        .mount(&fixture.server)
        .await;

    assert!(fixture.client.test_connection().await);
}

#[tokio::test]
async fn test_connection_probe_never_errors() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/v1/entities"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fixture.server)
        .await;

    assert!(!fixture.client.test_connection().await);
}
