mod error;
mod http;
mod interface;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

pub use error::ToolInvokeError;
pub use http::McpHttpClient;
pub use interface::{ToolDescriptor, ToolServerInterface};

/// Dispatches tool calls against the remote server and flattens results to
/// the text the model will see.
pub struct ToolRuntime {
    bridge: Arc<dyn ToolServerInterface>,
}

impl ToolRuntime {
    pub fn new(bridge: Arc<dyn ToolServerInterface>) -> Self {
        Self { bridge }
    }

    /// Invoke one tool and concatenate the text fragments of its result in
    /// order. Remote failures propagate unchanged; there is no retry.
    pub async fn invoke(&self, tool: &str, arguments: Value) -> Result<String, ToolInvokeError> {
        debug!(tool, "dispatching tool call");
        let result = self.bridge.call_tool(tool, arguments).await?;
        Ok(collect_text(&result))
    }
}

fn collect_text(result: &Value) -> String {
    let mut text = String::new();
    if let Some(content) = result.get("content").and_then(Value::as_array) {
        for block in content {
            let is_text = block
                .get("type")
                .and_then(Value::as_str)
                .map(|kind| kind.eq_ignore_ascii_case("text"))
                .unwrap_or(false);
            if is_text {
                if let Some(fragment) = block.get("text").and_then(Value::as_str) {
                    text.push_str(fragment);
                }
            }
        }
    }
    text
}
