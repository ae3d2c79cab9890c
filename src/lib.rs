//! # SolarWinds Observability MCP
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! the SolarWinds Observability REST API as a fixed set of callable tools,
//! so AI assistants can query infrastructure telemetry through structured
//! calls instead of raw HTTP.
//!
//! ## Overview
//!
//! The crate is split into two cooperating pieces:
//! - **Clients**: the authenticated REST client for entities, metrics,
//!   alerts, traces, logs, and archive listings, plus a separate bare
//!   client for pre-signed archive downloads
//! - **Tools**: one schema-declared tool per API operation, rendering
//!   results as text and wrapping failures as `Error: …` messages
//!
//! ## Available Tools
//!
//! ### Entities & Metrics
//! - `get_entities`: List monitored entities
//! - `get_entity`: Fetch a single entity
//! - `get_metrics`: Query metric samples
//!
//! ### Alerts
//! - `get_alerts`: List alert definitions
//! - `create_alert`: Create an alert definition
//! - `update_alert`: Update an alert definition
//! - `delete_alert`: Delete an alert definition
//!
//! ### Traces
//! - `get_traces`: List trace spans
//! - `get_trace`: Fetch all spans of one trace
//!
//! ### Logs
//! - `search_logs`: Search logs with query/group/time filters
//! - `list_log_archives`: List hourly log archives
//! - `download_log_archive`: Download and parse an archive
//!
//! ## Usage
//!
//! ### Creating the server
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swo_mcp::clients::{SwoClient, SwoConfig};
//! use swo_mcp::server::McpServer;
//! use swo_mcp::tools::all_tools;
//!
//! async fn setup() {
//!     let config = SwoConfig::from_env().expect("SWO_API_TOKEN is required");
//!     let client = Arc::new(SwoClient::new(config));
//!
//!     let server = McpServer::new("swo-mcp", env!("CARGO_PKG_VERSION"));
//!     server.register_tools(all_tools(client)).await;
//!
//!     let tools = server.list_tools().await;
//!     println!("Registered {} tools", tools.len());
//! }
//! ```
//!
//! ### Handling MCP requests
//!
//! ```rust,no_run
//! use swo_mcp::server::McpServer;
//! use swo_mcp::types::McpRequest;
//!
//! async fn handle(server: &McpServer, json: &str) {
//!     let request: McpRequest = serde_json::from_str(json).unwrap();
//!     let response = server.handle_request(request).await;
//!     println!("{}", serde_json::to_string(&response).unwrap());
//! }
//! ```

pub mod clients;
pub mod server;
pub mod tools;
pub mod types;

// Re-export main types
pub use server::{McpServer, McpServerError, McpServerResult, Tool, ToolContext};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolCall, ToolCapabilities, ToolDefinition, ToolResult,
};

// Re-export tool collections
pub use tools::{alert_tools, all_tools, entity_tools, log_tools, trace_tools};

// Re-export the API client
pub use clients::{SwoClient, SwoConfig, SwoError};
