//! Observability MCP tools
//!
//! One tool per exposed operation, grouped by domain area. Every tool
//! validates its arguments, delegates to the shared [`SwoClient`], and
//! renders the result as text; client failures become `Error: …` text
//! responses, never protocol-level faults.

pub mod alerts;
pub mod entities;
pub mod logs;
pub mod traces;

pub use alerts::*;
pub use entities::*;
pub use logs::*;
pub use traces::*;

use crate::clients::SwoClient;
use crate::server::{McpServerError, Tool};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Get all observability tools wired to the given client.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use swo_mcp::clients::{SwoClient, SwoConfig};
/// use swo_mcp::tools::all_tools;
///
/// let client = Arc::new(SwoClient::new(SwoConfig::new("token")));
/// let tools = all_tools(client);
/// println!("Available tools: {}", tools.len());
/// ```
pub fn all_tools(client: Arc<SwoClient>) -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();

    // Entity and metric tools (3)
    tools.extend(entity_tools(client.clone()));

    // Alert tools (4)
    tools.extend(alert_tools(client.clone()));

    // Trace tools (2)
    tools.extend(trace_tools(client.clone()));

    // Log and archive tools (3)
    tools.extend(log_tools(client));

    tools
}

/// Parse an RFC 3339 tool argument into a UTC timestamp.
pub(crate) fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, McpServerError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| McpServerError::InvalidParams(format!("{}: {}", field, e)))
}
