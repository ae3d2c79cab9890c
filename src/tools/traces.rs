//! Trace MCP tools
//!
//! Tools for querying distributed trace spans. The list operation degrades
//! to an empty result when the trace endpoint is unavailable; the
//! single-trace lookup fails hard on a missing trace.

use crate::clients::swo::{SwoClient, TimeRange};
use crate::server::{McpServerError, McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};

use super::parse_time;

/// Tool to list trace spans.
pub struct GetTracesTool {
    client: Arc<SwoClient>,
}

impl GetTracesTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetTracesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_traces", "Get distributed traces")
            .with_category("traces")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "serviceName": {
                        "type": "string",
                        "description": "Filter traces by service name"
                    },
                    "startTime": {
                        "type": "string",
                        "description": "Range start (ISO 8601); requires endTime"
                    },
                    "endTime": {
                        "type": "string",
                        "description": "Range end (ISO 8601); requires startTime"
                    }
                },
                "required": []
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "get_traces"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetTracesParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        let time_range = match (params.start_time.as_deref(), params.end_time.as_deref()) {
            (Some(start), Some(end)) => Some(TimeRange {
                start: parse_time("startTime", start)?,
                end: parse_time("endTime", end)?,
            }),
            _ => None,
        };

        let result = self
            .client
            .get_traces(params.service_name.as_deref(), time_range)
            .await;

        match result {
            Ok(traces) => Ok(ToolResult::json(serde_json::json!(traces))),
            Err(e) => {
                error!("Failed to fetch traces: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTracesParams {
    service_name: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

/// Tool to fetch all spans of one trace.
pub struct GetTraceTool {
    client: Arc<SwoClient>,
}

impl GetTraceTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetTraceTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_trace", "Get details of a specific trace")
            .with_category("traces")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "traceId": {
                        "type": "string",
                        "description": "The trace ID to fetch"
                    }
                },
                "required": ["traceId"]
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "get_trace"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetTraceParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        match self.client.get_trace(&params.trace_id).await {
            Ok(spans) => Ok(ToolResult::json(serde_json::json!(spans))),
            Err(e) => {
                error!("Failed to fetch trace {}: {}", params.trace_id, e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTraceParams {
    trace_id: String,
}

/// Get all trace tools.
pub fn trace_tools(client: Arc<SwoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetTracesTool::new(client.clone())),
        Arc::new(GetTraceTool::new(client)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SwoConfig;

    fn test_client() -> Arc<SwoClient> {
        Arc::new(SwoClient::new(SwoConfig::new("test-token")))
    }

    #[test]
    fn test_trace_tool_definitions() {
        let tools = trace_tools(test_client());
        let names: Vec<_> = tools.iter().map(|t| t.definition().name).collect();
        assert_eq!(names, vec!["get_traces", "get_trace"]);
    }

    #[tokio::test]
    async fn test_get_trace_requires_id() {
        let tool = GetTraceTool::new(test_client());
        let result = tool
            .execute(serde_json::json!({}), &ToolContext::empty())
            .await;
        assert!(matches!(result, Err(McpServerError::InvalidParams(_))));
    }
}
