use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::ToolInvokeError;
use super::interface::{ToolDescriptor, ToolServerInterface};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// MCP client speaking JSON-RPC over streamable HTTP to a Shellwright server.
///
/// The server answers each POST either with a plain JSON body or with a short
/// `text/event-stream` body carrying the response event; both are decoded
/// here. The `Mcp-Session-Id` header issued during `initialize` is echoed on
/// every subsequent request.
pub struct McpHttpClient {
    http: Client,
    endpoint: String,
    session: Mutex<Option<String>>,
    id_counter: AtomicU64,
}

impl McpHttpClient {
    /// Connect to `{base_url}/mcp` and run the initialize handshake.
    pub async fn connect(base_url: &str) -> Result<Self, ToolInvokeError> {
        let client = Self {
            http: Client::new(),
            endpoint: format!("{}/mcp", base_url.trim_end_matches('/')),
            session: Mutex::new(None),
            id_counter: AtomicU64::new(1),
        };
        client.initialize().await?;
        Ok(client)
    }

    async fn initialize(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {},
        });
        self.request("initialize", params).await?;
        self.notify("notifications/initialized", json!({})).await?;
        info!(endpoint = %self.endpoint, "connected to tool server");
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "sending tool server request");
        let response = self.post(&payload).await?;

        if let Some(session_id) = response
            .headers()
            .get("mcp-session-id")
            .and_then(|value| value.to_str().ok())
        {
            let mut session = self.session.lock().await;
            *session = Some(session_id.to_string());
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|source| ToolInvokeError::Http { source })?;

        let message = decode_rpc_body(&content_type, &body, id)?;
        if let Some(error) = message.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ToolInvokeError::Rpc { code, message });
        }
        Ok(message.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn notify(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.post(&payload).await?;
        Ok(())
    }

    async fn post(&self, payload: &Value) -> Result<reqwest::Response, ToolInvokeError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/json, text/event-stream")
            .json(payload);
        if let Some(session_id) = self.session.lock().await.clone() {
            request = request.header("Mcp-Session-Id", session_id);
        }
        request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ToolInvokeError::Http { source })
    }
}

#[async_trait]
impl ToolServerInterface for McpHttpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let result = self.request("tools/list", json!({})).await?;
        let mut descriptors = Vec::new();
        if let Some(tools) = result.get("tools").and_then(Value::as_array) {
            for tool in tools {
                let Some(name) = tool.get("name").and_then(Value::as_str) else {
                    continue;
                };
                descriptors.push(ToolDescriptor {
                    name: name.to_string(),
                    description: tool
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    input_schema: tool
                        .get("inputSchema")
                        .cloned()
                        .unwrap_or_else(|| json!({ "type": "object" })),
                });
            }
        }
        Ok(descriptors)
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            },
        });
        self.request("tools/call", params).await
    }
}

/// Decode a response body that is either plain JSON or a buffered SSE stream
/// containing the JSON-RPC response for `id`.
fn decode_rpc_body(content_type: &str, body: &str, id: u64) -> Result<Value, ToolInvokeError> {
    if !content_type.starts_with("text/event-stream") {
        return serde_json::from_str(body).map_err(|source| ToolInvokeError::InvalidJson { source });
    }

    for data in sse_data_events(body) {
        let message: Value = match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(_) => continue,
        };
        if message.get("id").and_then(Value::as_u64) == Some(id) {
            return Ok(message);
        }
    }
    Err(ToolInvokeError::Transport {
        message: format!("no response for request {id} in event stream"),
    })
}

/// Collect the `data:` payloads of a buffered SSE body, one string per event.
fn sse_data_events(body: &str) -> Vec<String> {
    let mut events = Vec::new();
    let mut current = String::new();
    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(rest.trim_start());
        } else if line.is_empty() && !current.is_empty() {
            events.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        events.push(current);
    }
    events
}
