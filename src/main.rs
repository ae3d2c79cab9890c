//! MCP server binary.
//!
//! Serves newline-delimited JSON-RPC over stdin/stdout. Stdout carries the
//! protocol; all logging goes to stderr.

use std::sync::Arc;

use swo_mcp::clients::{SwoClient, SwoConfig};
use swo_mcp::server::McpServer;
use swo_mcp::tools::all_tools;
use swo_mcp::types::{McpError, McpRequest, McpResponse, RequestId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match SwoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(api_url = %config.api_url, "Starting SolarWinds Observability MCP server");

    let client = Arc::new(SwoClient::new(config));

    let server = McpServer::new("swo-mcp", env!("CARGO_PKG_VERSION"));
    server.register_tools(all_tools(client.clone())).await;

    if !client.test_connection().await {
        warn!("Could not connect to the SolarWinds Observability API; check your credentials");
    }

    info!("SolarWinds Observability MCP server started");

    if let Err(e) = serve(&server).await {
        error!("Server terminated: {}", e);
        std::process::exit(1);
    }
}

/// Serve JSON-RPC requests line by line until stdin closes.
async fn serve(server: &McpServer) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<McpRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "Failed to parse request");
                McpResponse::error(RequestId::Null, McpError::parse_error())
            }
        };

        let serialized = serde_json::to_string(&response)
            .unwrap_or_else(|e| {
                // Response serialization failing is a programming error;
                // still answer with a well-formed internal error.
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": { "code": McpError::INTERNAL_ERROR, "message": e.to_string() }
                })
                .to_string()
            });

        stdout.write_all(serialized.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
