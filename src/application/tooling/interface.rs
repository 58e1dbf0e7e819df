use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

/// A tool advertised by the Shellwright server.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError>;
}
