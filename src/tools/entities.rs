//! Entity and metric MCP tools
//!
//! Tools for listing monitored entities, fetching a single entity, and
//! querying metric samples. Results are returned as indented JSON text.

use crate::clients::swo::{EntityType, SwoClient, TimeRange};
use crate::server::{McpServerError, McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::parse_time;

/// Tool to list monitored entities.
pub struct GetEntitiesTool {
    client: Arc<SwoClient>,
}

impl GetEntitiesTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetEntitiesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_entities", "Get a list of monitored entities")
            .with_category("entities")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["host", "application", "service", "database", "network"],
                        "description": "Filter entities by type"
                    }
                },
                "required": []
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "get_entities"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetEntitiesParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        debug!(entity_type = ?params.entity_type, "Listing entities");

        match self.client.get_entities(params.entity_type).await {
            Ok(entities) => Ok(ToolResult::json(serde_json::json!(entities))),
            Err(e) => {
                error!("Failed to fetch entities: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetEntitiesParams {
    #[serde(rename = "type")]
    entity_type: Option<EntityType>,
}

/// Tool to fetch a single entity by ID.
pub struct GetEntityTool {
    client: Arc<SwoClient>,
}

impl GetEntityTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetEntityTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_entity", "Get details of a specific entity")
            .with_category("entities")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "entityId": {
                        "type": "string",
                        "description": "The entity ID to look up"
                    }
                },
                "required": ["entityId"]
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "get_entity"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetEntityParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        match self.client.get_entity(&params.entity_id).await {
            Ok(entity) => Ok(ToolResult::json(serde_json::json!(entity))),
            Err(e) => {
                error!("Failed to fetch entity {}: {}", params.entity_id, e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEntityParams {
    entity_id: String,
}

/// Tool to query metric samples.
pub struct GetMetricsTool {
    client: Arc<SwoClient>,
}

impl GetMetricsTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetMetricsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_metrics", "Get metrics for an entity")
            .with_category("metrics")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "entityId": {
                        "type": "string",
                        "description": "Restrict metrics to one entity"
                    },
                    "metricNames": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Metric names to fetch"
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

    #[instrument(skip(self, _context), fields(tool = "get_metrics"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetMetricsParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        // The range applies only when both bounds are given.
        let time_range = match (params.start_time.as_deref(), params.end_time.as_deref()) {
            (Some(start), Some(end)) => Some(TimeRange {
                start: parse_time("startTime", start)?,
                end: parse_time("endTime", end)?,
            }),
            _ => None,
        };

        let result = self
            .client
            .get_metrics(
                params.entity_id.as_deref(),
                params.metric_names.as_deref(),
                time_range,
            )
            .await;

        match result {
            Ok(metrics) => Ok(ToolResult::json(serde_json::json!(metrics))),
            Err(e) => {
                error!("Failed to fetch metrics: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetMetricsParams {
    entity_id: Option<String>,
    metric_names: Option<Vec<String>>,
    start_time: Option<String>,
    end_time: Option<String>,
}

/// Get all entity and metric tools.
pub fn entity_tools(client: Arc<SwoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetEntitiesTool::new(client.clone())),
        Arc::new(GetEntityTool::new(client.clone())),
        Arc::new(GetMetricsTool::new(client)),
    ]
}
