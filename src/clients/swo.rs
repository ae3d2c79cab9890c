//! SolarWinds Observability API client.
//!
//! HTTP client for the SolarWinds Observability REST API. Provides methods
//! for entity lookup, metrics, alert CRUD, distributed traces, log search,
//! and log archive listing. Every operation issues a single authenticated
//! request and reshapes the upstream JSON into the typed records below.
//!
//! Archive payload retrieval lives in [`crate::clients::archive`]; it must
//! not share this client because pre-signed URLs reject extra headers.

use super::config::SwoConfig;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Default page size for log searches.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// SolarWinds Observability client errors.
#[derive(Debug, Error)]
pub enum SwoError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Entity not found.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Trace not found.
    #[error("Trace not found or traces not supported: {0}")]
    TraceNotFound(String),

    /// The endpoint exists in newer API revisions only.
    #[error("{operation} not supported in current API")]
    NotSupported {
        /// The operation that is unavailable.
        operation: &'static str,
    },

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Archive download failed.
    #[error("Archive download failed: {0}")]
    ArchiveDownload(String),

    /// Archive download exceeded the wait bound.
    #[error("Archive download timed out after {0} seconds")]
    DownloadTimeout(u64),
}

/// Kind of monitored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Physical or virtual host.
    Host,
    /// Deployed application.
    Application,
    /// Logical service.
    Service,
    /// Database instance.
    Database,
    /// Network device.
    Network,
}

impl EntityType {
    /// Wire name of the entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Host => "host",
            EntityType::Application => "application",
            EntityType::Service => "service",
            EntityType::Database => "database",
            EntityType::Network => "network",
        }
    }
}

/// Health status of a monitored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Operating normally.
    Healthy,
    /// Degraded but functional.
    Warning,
    /// Requires attention.
    Critical,
    /// Status not reported.
    #[serde(other)]
    Unknown,
}

/// A monitored entity as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity ID.
    pub id: String,

    /// Entity kind.
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Display name.
    pub name: String,

    /// Health status.
    pub status: EntityStatus,

    /// Current metric samples, when included by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetricSample>>,

    /// Arbitrary entity metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A single metric sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    /// Metric name.
    pub name: String,

    /// Sample value. Zero when the API omits it.
    #[serde(default)]
    pub value: f64,

    /// Sample timestamp.
    pub timestamp: DateTime<Utc>,

    /// Metric tags.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Critical severity.
    Critical,
    /// Warning severity.
    Warning,
    /// Informational severity.
    Info,
}

/// An alert definition as stored upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDefinition {
    /// Alert ID, assigned upstream on create.
    pub id: String,

    /// Alert name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Condition expression.
    pub condition: String,

    /// Severity.
    pub severity: AlertSeverity,

    /// Whether the alert is active.
    pub enabled: bool,
}

/// A new alert definition to create. The ID is assigned upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlert {
    /// Alert name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Condition expression.
    pub condition: String,

    /// Severity.
    pub severity: AlertSeverity,

    /// Whether the alert is active.
    pub enabled: bool,
}

/// A partial alert update. Only the provided fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New condition expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// New severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,

    /// New enabled flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A single span of a distributed trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpan {
    /// Trace ID.
    pub trace_id: String,

    /// Span ID.
    pub span_id: String,

    /// Parent span ID, absent for root spans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// Operation name.
    pub operation_name: String,

    /// Service name.
    pub service_name: String,

    /// Duration in milliseconds.
    pub duration: f64,

    /// Span start time.
    pub start_time: DateTime<Utc>,

    /// Span tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A normalized log entry.
///
/// Only constructed through [`LogEntry::from_raw`], so the live-search and
/// archive-download paths resolve `level` and `source` through the same
/// fallback chain.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Entry timestamp.
    pub timestamp: DateTime<Utc>,

    /// Normalized level (lowercased `severity`, then `level`, then "info").
    pub level: String,

    /// Log message.
    pub message: String,

    /// Emitting source (`hostname`, then `program`, then `source`).
    pub source: String,

    /// Remaining attributes of the record.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    /// Normalize a raw upstream log record.
    ///
    /// Upstream field naming is inconsistent across endpoints
    /// (`time`/`timestamp`, `severity`/`level`, `hostname`/`program`/
    /// `source`); each field resolves through an ordered fallback chain.
    pub fn from_raw(raw: &serde_json::Value) -> Self {
        let timestamp = raw
            .get("time")
            .or_else(|| raw.get("timestamp"))
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        let level = raw
            .get("severity")
            .and_then(|v| v.as_str())
            .map(|s| s.to_lowercase())
            .or_else(|| {
                raw.get("level")
                    .and_then(|v| v.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| "info".to_string());

        let message = raw
            .get("message")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| raw.to_string().chars().take(200).collect());

        let source = ["hostname", "program", "source"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(|v| v.as_str()))
            .unwrap_or("unknown")
            .to_string();

        let mut attributes = serde_json::Map::new();
        for key in ["id", "program", "hostname"] {
            if let Some(value) = raw.get(key) {
                attributes.insert(key.to_string(), value.clone());
            }
        }
        if let Some(extra) = raw.get("attributes").and_then(|v| v.as_object()) {
            for (key, value) in extra {
                attributes.insert(key.clone(), value.clone());
            }
        }

        Self {
            timestamp,
            level,
            message,
            source,
            attributes,
        }
    }
}

/// A log archive: an hourly compressed bundle stored on object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogArchive {
    /// Archive ID.
    pub id: String,

    /// Archive file name.
    pub name: String,

    /// Pre-signed, time-limited download URL.
    pub download_url: String,

    /// Archival time as epoch seconds, stringly typed upstream.
    pub archived_timestamp: String,

    /// Compressed size in bytes.
    pub archive_size: u64,
}

/// An inclusive time window with both bounds required.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    /// Window start.
    pub start: DateTime<Utc>,

    /// Window end.
    pub end: DateTime<Utc>,
}

/// Parameters for a log search.
#[derive(Debug, Clone, Default)]
pub struct LogSearch {
    /// Free-text query.
    pub query: Option<String>,

    /// Source group filters, OR-combined.
    pub groups: Vec<String>,

    /// Lower time bound. Independent of `end_time`.
    pub start_time: Option<DateTime<Utc>>,

    /// Upper time bound. Independent of `start_time`.
    pub end_time: Option<DateTime<Utc>>,

    /// Page size; defaults to [`DEFAULT_LOG_LIMIT`].
    pub limit: Option<usize>,
}

/// Format a timestamp the way the API expects query parameters:
/// ISO 8601 with millisecond precision and a `Z` suffix.
pub(crate) fn iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    if let Some(text) = value.as_str() {
        return DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    // Numeric timestamps are epoch milliseconds.
    value
        .as_i64()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

/// Build the log search filter expression.
///
/// Group clauses combine with OR and are parenthesized when there is more
/// than one; the free-text query combines with the group clause via AND.
/// Returns `None` when there is nothing to filter on, so no empty `filter`
/// parameter is ever sent.
pub(crate) fn build_log_filter(groups: &[String], query: Option<&str>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    match groups {
        [] => {}
        [only] => parts.push(format!("group:{}", only)),
        many => {
            let clause = many
                .iter()
                .map(|g| format!("group:{}", g))
                .collect::<Vec<_>>()
                .join(" OR ");
            parts.push(format!("({})", clause));
        }
    }

    if let Some(query) = query {
        if !query.is_empty() {
            parts.push(query.to_string());
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct MetricsResponse {
    #[serde(default, rename = "metricsInfo")]
    metrics_info: Vec<RawMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetric {
    name: String,
    value: Option<f64>,
    last_reported_time: DateTime<Utc>,
    tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    alerts: Vec<AlertDefinition>,
}

#[derive(Debug, Deserialize)]
struct TracesResponse {
    #[serde(default)]
    traces: Vec<TraceSpan>,
}

#[derive(Debug, Deserialize)]
struct TraceResponse {
    #[serde(default)]
    spans: Vec<TraceSpan>,
}

#[derive(Debug, Deserialize)]
struct ArchivesResponse {
    #[serde(default, rename = "logArchives")]
    log_archives: Vec<LogArchive>,
}

/// SolarWinds Observability API client.
///
/// Cheap to clone; holds only the HTTP client and the immutable
/// configuration, so concurrent tool calls need no coordination.
#[derive(Clone)]
pub struct SwoClient {
    /// HTTP client instance.
    client: Client,

    /// API configuration.
    config: SwoConfig,
}

impl SwoClient {
    /// Create a new client from the given configuration.
    pub fn new(config: SwoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.config.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.config.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
    }

    fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .patch(self.config.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.config.url(path))
            .header("Authorization", format!("Bearer {}", self.config.api_token))
    }

    /// List monitored entities, optionally filtered by type.
    #[instrument(skip(self))]
    pub async fn get_entities(
        &self,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<Entity>, SwoError> {
        let mut request = self.get("/v1/entities");
        if let Some(entity_type) = entity_type {
            request = request.query(&[("type", entity_type.as_str())]);
        }

        let response = request.send().await?;
        let body: EntitiesResponse = self.handle_response(response).await?;
        Ok(body.entities)
    }

    /// Fetch a single entity by ID.
    #[instrument(skip(self), fields(entity_id = %entity_id))]
    pub async fn get_entity(&self, entity_id: &str) -> Result<Entity, SwoError> {
        let response = self
            .get(&format!("/v1/entities/{}", entity_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SwoError::EntityNotFound(entity_id.to_string()));
        }

        self.handle_response(response).await
    }

    /// Fetch metric samples, filtered by any combination of entity,
    /// metric names, and time range.
    #[instrument(skip(self, metric_names, time_range))]
    pub async fn get_metrics(
        &self,
        entity_id: Option<&str>,
        metric_names: Option<&[String]>,
        time_range: Option<TimeRange>,
    ) -> Result<Vec<MetricSample>, SwoError> {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(entity_id) = entity_id {
            params.push(("entityId", entity_id.to_string()));
        }
        if let Some(names) = metric_names {
            if !names.is_empty() {
                params.push(("names", names.join(",")));
            }
        }
        if let Some(range) = time_range {
            params.push(("startTime", iso8601(range.start)));
            params.push(("endTime", iso8601(range.end)));
        }

        let response = self.get("/v1/metrics").query(&params).send().await?;
        let body: MetricsResponse = self.handle_response(response).await?;

        Ok(body
            .metrics_info
            .into_iter()
            .map(|metric| MetricSample {
                name: metric.name,
                value: metric.value.unwrap_or(0.0),
                timestamp: metric.last_reported_time,
                tags: metric.tags.unwrap_or_default(),
            })
            .collect())
    }

    /// List alert definitions.
    ///
    /// Degrades to an empty list when the alert endpoint is unavailable
    /// (404); the mutating alert operations fail explicitly instead.
    #[instrument(skip(self))]
    pub async fn get_alerts(&self, active: Option<bool>) -> Result<Vec<AlertDefinition>, SwoError> {
        let mut request = self.get("/v1/alerts");
        if let Some(active) = active {
            request = request.query(&[("active", active)]);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Alert endpoint unavailable, returning empty list");
            return Ok(Vec::new());
        }

        let body: AlertsResponse = self.handle_response(response).await?;
        Ok(body.alerts)
    }

    /// Create a new alert definition.
    #[instrument(skip(self, alert), fields(name = %alert.name))]
    pub async fn create_alert(&self, alert: &NewAlert) -> Result<AlertDefinition, SwoError> {
        let response = self.post("/v1/alerts").json(alert).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SwoError::NotSupported {
                operation: "Alert creation",
            });
        }

        self.handle_response(response).await
    }

    /// Update an existing alert definition.
    #[instrument(skip(self, updates), fields(alert_id = %alert_id))]
    pub async fn update_alert(
        &self,
        alert_id: &str,
        updates: &AlertUpdate,
    ) -> Result<AlertDefinition, SwoError> {
        let response = self
            .patch(&format!("/v1/alerts/{}", alert_id))
            .json(updates)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SwoError::NotSupported {
                operation: "Alert updates",
            });
        }

        self.handle_response(response).await
    }

    /// Delete an alert definition.
    #[instrument(skip(self), fields(alert_id = %alert_id))]
    pub async fn delete_alert(&self, alert_id: &str) -> Result<(), SwoError> {
        let response = self
            .delete(&format!("/v1/alerts/{}", alert_id))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SwoError::NotSupported {
                operation: "Alert deletion",
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(SwoError::AuthenticationFailed);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SwoError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// List trace spans, optionally filtered by service and time range.
    ///
    /// Degrades to an empty list when the trace endpoint is unavailable.
    #[instrument(skip(self, time_range))]
    pub async fn get_traces(
        &self,
        service_name: Option<&str>,
        time_range: Option<TimeRange>,
    ) -> Result<Vec<TraceSpan>, SwoError> {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(service) = service_name {
            params.push(("service", service.to_string()));
        }
        if let Some(range) = time_range {
            params.push(("startTime", iso8601(range.start)));
            params.push(("endTime", iso8601(range.end)));
        }

        let response = self.get("/v1/traces").query(&params).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Trace endpoint unavailable, returning empty list");
            return Ok(Vec::new());
        }

        let body: TracesResponse = self.handle_response(response).await?;
        Ok(body.traces)
    }

    /// Fetch all spans of one trace.
    ///
    /// Unlike [`get_traces`](Self::get_traces), a 404 here is a hard
    /// failure: the trace itself is absent.
    #[instrument(skip(self), fields(trace_id = %trace_id))]
    pub async fn get_trace(&self, trace_id: &str) -> Result<Vec<TraceSpan>, SwoError> {
        let response = self
            .get(&format!("/v1/traces/{}", trace_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SwoError::TraceNotFound(trace_id.to_string()));
        }

        let body: TraceResponse = self.handle_response(response).await?;
        Ok(body.spans)
    }

    /// Search logs.
    ///
    /// The upstream response is re-sliced locally to the requested limit;
    /// upstream does not honor the limit parameter reliably.
    #[instrument(skip(self, search))]
    pub async fn search_logs(&self, search: &LogSearch) -> Result<Vec<LogEntry>, SwoError> {
        let limit = search.limit.unwrap_or(DEFAULT_LOG_LIMIT);

        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(filter) = build_log_filter(&search.groups, search.query.as_deref()) {
            params.push(("filter", filter));
        }
        if let Some(start) = search.start_time {
            params.push(("startTime", iso8601(start)));
        }
        if let Some(end) = search.end_time {
            params.push(("endTime", iso8601(end)));
        }

        debug!(?params, "Requesting logs");

        let response = self.get("/v1/logs").query(&params).send().await?;
        let body: serde_json::Value = self.handle_response(response).await?;

        // Logs arrive either wrapped in a `logs` field or as a bare array.
        let raw_logs: &[serde_json::Value] = match body.get("logs").and_then(|v| v.as_array()) {
            Some(wrapped) => wrapped,
            None => body.as_array().map(|a| a.as_slice()).unwrap_or(&[]),
        };

        Ok(raw_logs.iter().take(limit).map(LogEntry::from_raw).collect())
    }

    /// List log archives for an inclusive time window. Both bounds are
    /// mandatory, unlike log search.
    #[instrument(skip(self))]
    pub async fn list_log_archives(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LogArchive>, SwoError> {
        let params = [
            ("startTime", iso8601(start_time)),
            ("endTime", iso8601(end_time)),
        ];

        debug!(?params, "Requesting log archives");

        let response = self.get("/v1/logs/archives").query(&params).send().await?;
        let body: ArchivesResponse = self.handle_response(response).await?;
        Ok(body.log_archives)
    }

    /// Probe connectivity with a minimal entity list call.
    ///
    /// Never fails; used only as a startup health check.
    pub async fn test_connection(&self) -> bool {
        let result = self
            .get("/v1/entities")
            .query(&[("limit", "1")])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), "Connection test failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Connection test failed");
                false
            }
        }
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, SwoError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            error!("SolarWinds Observability authentication failed");
            return Err(SwoError::AuthenticationFailed);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("API error ({}): {}", status.as_u16(), message);
            return Err(SwoError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SwoError::InvalidResponse(e.to_string()))
    }
}
