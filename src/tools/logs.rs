//! Log MCP tools
//!
//! Tools for log search, archive listing, and archive download. Log result
//! sets can be large, so the search and download tools render truncated,
//! summarized text instead of raw JSON: exception/error entries are
//! surfaced first, and a level-count breakdown covers the full result set.

use crate::clients::archive;
use crate::clients::swo::{iso8601, LogArchive, LogEntry, LogSearch, SwoClient};
use crate::server::{McpServerError, McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::parse_time;

/// Display cap for log entries in a single response.
const MAX_LOGS_TO_SHOW: usize = 10;

/// Attribute keys worth surfacing alongside an exception/error entry.
const IMPORTANT_ATTRS: [&str; 4] = ["stacktrace", "error", "exception", "trace"];

/// Tool to search logs.
pub struct SearchLogsTool {
    client: Arc<SwoClient>,
}

impl SearchLogsTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchLogsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "search_logs",
            "Search logs with query, source groups, and/or time filtering (startTime and/or endTime)",
        )
        .with_category("logs")
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-text search query"
                },
                "groups": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Source groups to search; multiple groups combine with OR"
                },
                "startTime": {
                    "type": "string",
                    "description": "Lower time bound (ISO 8601); usable without endTime"
                },
                "endTime": {
                    "type": "string",
                    "description": "Upper time bound (ISO 8601); usable without startTime"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 1000,
                    "description": "Maximum number of logs to fetch"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, _context), fields(tool = "search_logs"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: SearchLogsParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        // Time bounds are independent; either, both, or neither.
        let start_time = params
            .start_time
            .as_deref()
            .map(|s| parse_time("startTime", s))
            .transpose()?;
        let end_time = params
            .end_time
            .as_deref()
            .map(|s| parse_time("endTime", s))
            .transpose()?;

        let search = LogSearch {
            query: params.query,
            groups: params.groups,
            start_time,
            end_time,
            limit: params.limit,
        };

        match self.client.search_logs(&search).await {
            Ok(logs) => {
                debug!(count = logs.len(), "Log search complete");
                Ok(ToolResult::text(format_search_results(&logs)))
            }
            Err(e) => {
                error!("Failed to search logs: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchLogsParams {
    query: Option<String>,
    #[serde(default)]
    groups: Vec<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    limit: Option<usize>,
}

/// Tool to list log archives for a time window.
pub struct ListLogArchivesTool {
    client: Arc<SwoClient>,
}

impl ListLogArchivesTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListLogArchivesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_log_archives",
            "List available log archive files for a time range (archives are hourly compressed JSON files stored on S3)",
        )
        .with_category("logs")
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "startTime": {
                    "type": "string",
                    "description": "Window start (ISO 8601)"
                },
                "endTime": {
                    "type": "string",
                    "description": "Window end (ISO 8601)"
                }
            },
            "required": ["startTime", "endTime"]
        }))
    }

    #[instrument(skip(self, _context), fields(tool = "list_log_archives"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: ListLogArchivesParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        let start_time = parse_time("startTime", &params.start_time)?;
        let end_time = parse_time("endTime", &params.end_time)?;

        match self.client.list_log_archives(start_time, end_time).await {
            Ok(archives) => Ok(ToolResult::text(format_archive_list(&archives))),
            Err(e) => {
                error!("Failed to list log archives: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListLogArchivesParams {
    start_time: String,
    end_time: String,
}

/// Tool to download and parse a log archive.
pub struct DownloadLogArchiveTool;

impl DownloadLogArchiveTool {
    /// Create the tool. Archive download needs no API client; the
    /// pre-signed URL is self-authenticating.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DownloadLogArchiveTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DownloadLogArchiveTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "download_log_archive",
            "Download and decompress a log archive file, returning parsed log entries",
        )
        .with_category("logs")
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "downloadUrl": {
                    "type": "string",
                    "description": "Pre-signed archive download URL from list_log_archives"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 10000,
                    "description": "Parse at most this many entries"
                }
            },
            "required": ["downloadUrl"]
        }))
    }

    #[instrument(skip(self, _context, args), fields(tool = "download_log_archive"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: DownloadLogArchiveParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        match archive::download_and_unzip_archive(&params.download_url, params.limit).await {
            Ok(logs) => Ok(ToolResult::text(format_archive_download(
                &logs,
                params.limit,
            ))),
            Err(e) => {
                error!("Failed to download archive: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadLogArchiveParams {
    download_url: String,
    limit: Option<usize>,
}

/// Get all log tools.
pub fn log_tools(client: Arc<SwoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(SearchLogsTool::new(client.clone())),
        Arc::new(ListLogArchivesTool::new(client)),
        Arc::new(DownloadLogArchiveTool::new()),
    ]
}

/// Clip a message for display, appending an ellipsis when shortened.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut clipped: String = text.chars().take(max).collect();
        clipped.push_str("...");
        clipped
    } else {
        text.to_string()
    }
}

/// Count entries per level, preserving first-seen order.
fn level_counts(logs: &[LogEntry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for log in logs {
        match counts.iter_mut().find(|(level, _)| *level == log.level) {
            Some((_, count)) => *count += 1,
            None => counts.push((log.level.clone(), 1)),
        }
    }
    counts
}

fn format_level_counts(logs: &[LogEntry]) -> String {
    level_counts(logs)
        .into_iter()
        .map(|(level, count)| format!("{}({})", level, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_exception(log: &LogEntry) -> bool {
    let message = log.message.to_lowercase();
    message.contains("exception") || message.contains("error") || log.level == "error"
}

/// Render a log search result set.
///
/// At most [`MAX_LOGS_TO_SHOW`] entries are displayed. Exception/error
/// entries among the displayed set are surfaced first with their key
/// attributes; otherwise a short chronological digest is shown. When more
/// entries matched than are displayed, a trailing summary reports the true
/// total and a per-level count over the full set.
pub(crate) fn format_search_results(logs: &[LogEntry]) -> String {
    let displayed = &logs[..logs.len().min(MAX_LOGS_TO_SHOW)];

    let mut summary = String::new();
    if logs.len() > MAX_LOGS_TO_SHOW {
        summary = format!(
            "\n\nShowing {} of {} total logs. Log levels: {}",
            MAX_LOGS_TO_SHOW,
            logs.len(),
            format_level_counts(logs)
        );
    }

    let exceptions: Vec<&LogEntry> = displayed.iter().filter(|log| is_exception(log)).collect();

    let mut text = String::new();

    if !exceptions.is_empty() {
        text.push_str(&format!(
            "Found {} exception/error logs:\n\n",
            exceptions.len()
        ));
        for (index, log) in exceptions.iter().enumerate() {
            text.push_str(&format!("[{}] {}\n", index + 1, iso8601(log.timestamp)));
            text.push_str(&format!("Level: {}\n", log.level));
            text.push_str(&format!("Source: {}\n", log.source));
            text.push_str(&format!("Message: {}\n", clip(&log.message, 500)));

            let relevant: serde_json::Map<String, serde_json::Value> = log
                .attributes
                .iter()
                .filter(|(key, _)| {
                    let key = key.to_lowercase();
                    IMPORTANT_ATTRS.iter().any(|attr| key.contains(attr))
                })
                .take(3)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            if !relevant.is_empty() {
                let rendered =
                    serde_json::to_string_pretty(&serde_json::Value::Object(relevant))
                        .unwrap_or_default();
                let rendered: String = rendered.chars().take(300).collect();
                text.push_str(&format!("Key attributes: {}\n", rendered));
            }

            text.push_str("\n---\n\n");
        }
    } else if !displayed.is_empty() {
        text.push_str(&format!(
            "Found {} logs matching query. Most recent logs:\n\n",
            logs.len()
        ));
        for (index, log) in displayed.iter().take(5).enumerate() {
            text.push_str(&format!(
                "[{}] {} - {} - {}\n",
                index + 1,
                iso8601(log.timestamp),
                log.level,
                log.source
            ));
            text.push_str(&format!("{}\n\n", clip(&log.message, 200)));
        }
    } else {
        text.push_str("No logs found matching the query.");
    }

    text.push_str(&summary);
    text
}

/// Render the archive list as a numbered human-readable report.
pub(crate) fn format_archive_list(archives: &[LogArchive]) -> String {
    let summary = format!(
        "Found {} log archive(s) for the specified time range:\n\n",
        archives.len()
    );

    let rendered: Vec<String> = archives
        .iter()
        .enumerate()
        .map(|(index, archive)| {
            let size_mb = archive.archive_size as f64 / (1024.0 * 1024.0);
            // archivedTimestamp is epoch seconds, stringly typed upstream.
            let archived = archive
                .archived_timestamp
                .parse::<i64>()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .map(iso8601)
                .unwrap_or_else(|| archive.archived_timestamp.clone());

            format!(
                "[{}] {}\n  Size: {:.2} MB\n  Archived: {}\n  Archive ID: {}\n  Download URL: {}",
                index + 1,
                archive.name,
                size_mb,
                archived,
                archive.id,
                archive.download_url
            )
        })
        .collect();

    summary + &rendered.join("\n\n")
}

/// Render a downloaded archive: totals, a capped entry listing, and the
/// full level distribution.
pub(crate) fn format_archive_download(logs: &[LogEntry], limit: Option<usize>) -> String {
    let mut summary = format!(
        "Successfully downloaded and decompressed archive. Total entries: {}\n",
        logs.len()
    );
    if let Some(limit) = limit {
        if logs.len() >= limit {
            summary.push_str(&format!("(limited to first {} entries)\n", limit));
        }
    }
    summary.push_str(&format!(
        "\nShowing first {} entries:\n\n",
        logs.len().min(MAX_LOGS_TO_SHOW)
    ));

    let entries: Vec<String> = logs
        .iter()
        .take(MAX_LOGS_TO_SHOW)
        .enumerate()
        .map(|(index, log)| {
            format!(
                "[{}] {} - {} - {}\n{}",
                index + 1,
                iso8601(log.timestamp),
                log.level,
                log.source,
                clip(&log.message, 300)
            )
        })
        .collect();

    let stats = format!("\n\nLog level distribution: {}", format_level_counts(logs));

    summary + &entries.join("\n\n") + &stats
}
