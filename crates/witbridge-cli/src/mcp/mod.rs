//! MCP (Model Context Protocol) server for agent integration.
//!
//! Exposes the work item access layer as tools over JSON-RPC on
//! stdin/stdout. Tool handlers call the remote service, so request
//! handling is async; responses are written line by line.

mod protocol;
mod tools;

use anyhow::{Context, Result};
use protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability, ToolsListResult,
};
use serde_json::json;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use witbridge_client::WitClient;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "witbridge";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the MCP server, reading from stdin and writing to stdout.
pub async fn serve(client: &WitClient) -> Result<()> {
    info!("Starting MCP server");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        debug!("Received: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let response = JsonRpcResponse::error(None, -32700, format!("Parse error: {e}"));
                write_response(&mut stdout, &response)?;
                continue;
            }
        };

        if let Some(response) = handle_request(client, &request).await {
            write_response(&mut stdout, &response)?;
        }
    }

    Ok(())
}

fn write_response(stdout: &mut io::Stdout, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    debug!("Sending: {}", json);
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

async fn handle_request(client: &WitClient, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    match request.method.as_str() {
        "initialize" => Some(handle_initialize(request)),
        "tools/list" => Some(handle_tools_list(request)),
        "tools/call" => Some(handle_tools_call(client, request).await),
        "ping" => Some(JsonRpcResponse::success(request.id.clone(), json!({}))),
        method if method.starts_with("notifications/") || method == "initialized" => {
            // Notifications expect no response
            debug!("Received notification: {}", method);
            None
        }
        _ => {
            error!("Unknown method: {}", request.method);
            Some(JsonRpcResponse::error(
                request.id.clone(),
                -32601,
                format!("Method not found: {}", request.method),
            ))
        }
    }
}

fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability { list_changed: false },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
        Err(e) => JsonRpcResponse::error(request.id.clone(), -32603, e.to_string()),
    }
}

fn handle_tools_list(request: &JsonRpcRequest) -> JsonRpcResponse {
    let result = ToolsListResult {
        tools: tools::get_tool_definitions(),
    };
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
        Err(e) => JsonRpcResponse::error(request.id.clone(), -32603, e.to_string()),
    }
}

async fn handle_tools_call(client: &WitClient, request: &JsonRpcRequest) -> JsonRpcResponse {
    let params: ToolCallParams = match &request.params {
        Some(params) => match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    -32602,
                    format!("Invalid params: {e}"),
                )
            }
        },
        None => return JsonRpcResponse::error(request.id.clone(), -32602, "Missing params"),
    };

    info!("Tool call: {} with args: {:?}", params.name, params.arguments);

    let result = tools::handle_tool_call(client, &params.name, params.arguments).await;

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
        Err(e) => JsonRpcResponse::error(request.id.clone(), -32603, e.to_string()),
    }
}
