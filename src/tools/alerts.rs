//! Alert MCP tools
//!
//! CRUD tools for alert definitions. Reads degrade gracefully when the
//! upstream alert subsystem is unavailable; mutations fail explicitly so
//! a write never silently no-ops.

use crate::clients::swo::{AlertSeverity, AlertUpdate, NewAlert, SwoClient};
use crate::server::{McpServerError, McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Tool to list alert definitions.
pub struct GetAlertsTool {
    client: Arc<SwoClient>,
}

impl GetAlertsTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetAlertsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_alerts", "Get alert definitions")
            .with_category("alerts")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "active": {
                        "type": "boolean",
                        "description": "Only return enabled alerts"
                    }
                },
                "required": []
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "get_alerts"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: GetAlertsParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        match self.client.get_alerts(params.active).await {
            Ok(alerts) => Ok(ToolResult::json(serde_json::json!(alerts))),
            Err(e) => {
                error!("Failed to fetch alerts: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetAlertsParams {
    active: Option<bool>,
}

/// Tool to create a new alert definition.
pub struct CreateAlertTool {
    client: Arc<SwoClient>,
}

impl CreateAlertTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreateAlertTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_alert", "Create a new alert definition")
            .with_category("alerts")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Alert name"
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional alert description"
                    },
                    "condition": {
                        "type": "string",
                        "description": "Condition expression that triggers the alert"
                    },
                    "severity": {
                        "type": "string",
                        "enum": ["critical", "warning", "info"],
                        "description": "Alert severity"
                    },
                    "enabled": {
                        "type": "boolean",
                        "description": "Whether the alert is active",
                        "default": true
                    }
                },
                "required": ["name", "condition", "severity"]
            }))
    }

    #[instrument(skip(self, _context, args), fields(tool = "create_alert"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: CreateAlertParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        debug!(name = %params.name, "Creating alert");

        let alert = NewAlert {
            name: params.name,
            description: params.description,
            condition: params.condition,
            severity: params.severity,
            enabled: params.enabled,
        };

        match self.client.create_alert(&alert).await {
            Ok(created) => Ok(ToolResult::json(serde_json::json!(created))),
            Err(e) => {
                error!("Failed to create alert: {}", e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateAlertParams {
    name: String,
    description: Option<String>,
    condition: String,
    severity: AlertSeverity,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Tool to update an existing alert definition.
pub struct UpdateAlertTool {
    client: Arc<SwoClient>,
}

impl UpdateAlertTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for UpdateAlertTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("update_alert", "Update an existing alert")
            .with_category("alerts")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "alertId": {
                        "type": "string",
                        "description": "The alert ID to update"
                    },
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "condition": {"type": "string"},
                    "severity": {
                        "type": "string",
                        "enum": ["critical", "warning", "info"]
                    },
                    "enabled": {"type": "boolean"}
                },
                "required": ["alertId"]
            }))
    }

    #[instrument(skip(self, _context, args), fields(tool = "update_alert"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: UpdateAlertParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        let updates = AlertUpdate {
            name: params.name,
            description: params.description,
            condition: params.condition,
            severity: params.severity,
            enabled: params.enabled,
        };

        match self.client.update_alert(&params.alert_id, &updates).await {
            Ok(updated) => Ok(ToolResult::json(serde_json::json!(updated))),
            Err(e) => {
                error!("Failed to update alert {}: {}", params.alert_id, e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAlertParams {
    alert_id: String,
    name: Option<String>,
    description: Option<String>,
    condition: Option<String>,
    severity: Option<AlertSeverity>,
    enabled: Option<bool>,
}

/// Tool to delete an alert definition.
pub struct DeleteAlertTool {
    client: Arc<SwoClient>,
}

impl DeleteAlertTool {
    /// Create the tool with an injected client.
    pub fn new(client: Arc<SwoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for DeleteAlertTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("delete_alert", "Delete an alert definition")
            .with_category("alerts")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "alertId": {
                        "type": "string",
                        "description": "The alert ID to delete"
                    }
                },
                "required": ["alertId"]
            }))
    }

    #[instrument(skip(self, _context), fields(tool = "delete_alert"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: DeleteAlertParams = serde_json::from_value(args)
            .map_err(|e| McpServerError::InvalidParams(e.to_string()))?;

        match self.client.delete_alert(&params.alert_id).await {
            Ok(()) => Ok(ToolResult::text(format!(
                "Alert {} deleted successfully",
                params.alert_id
            ))),
            Err(e) => {
                error!("Failed to delete alert {}: {}", params.alert_id, e);
                Ok(ToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAlertParams {
    alert_id: String,
}

/// Get all alert tools.
pub fn alert_tools(client: Arc<SwoClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetAlertsTool::new(client.clone())),
        Arc::new(CreateAlertTool::new(client.clone())),
        Arc::new(UpdateAlertTool::new(client.clone())),
        Arc::new(DeleteAlertTool::new(client)),
    ]
}
