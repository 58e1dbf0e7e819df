//! Adapters between domain types and the OpenAI wire format

use serde_json::{Value, json};

use crate::application::tooling::ToolDescriptor;
use crate::domain::{Message, ToolCallRequest};

/// Adapter for converting transcript messages to the chat-completions format.
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style format.
    /// Returns: [{"role": "...", "content": "...", ...}]
    pub fn to_openai_format(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|message| match message {
                Message::System { content } => json!({
                    "role": "system",
                    "content": content,
                }),
                Message::User { content } => json!({
                    "role": "user",
                    "content": content,
                }),
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut wire = json!({
                        "role": "assistant",
                        "content": content,
                    });
                    if !tool_calls.is_empty() {
                        wire["tool_calls"] =
                            Value::Array(tool_calls.iter().map(Self::tool_call_to_wire).collect());
                    }
                    wire
                }
                Message::Tool {
                    tool_call_id,
                    content,
                } => json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": content,
                }),
            })
            .collect()
    }

    fn tool_call_to_wire(call: &ToolCallRequest) -> Value {
        json!({
            "id": call.id,
            "type": "function",
            "function": {
                "name": call.name,
                "arguments": Value::Object(call.arguments.clone()).to_string(),
            },
        })
    }
}

/// Converts the server's tool descriptors into the function schemas the
/// model API expects. Pure and total; an empty catalog yields an empty list,
/// which leaves the conversation non-agentic.
pub struct ToolCatalogAdapter;

impl ToolCatalogAdapter {
    pub fn to_function_schemas(descriptors: &[ToolDescriptor]) -> Vec<Value> {
        descriptors
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description.clone().unwrap_or_default(),
                        "parameters": tool.input_schema,
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map as JsonMap;

    #[test]
    fn empty_catalog_maps_to_empty_schemas() {
        assert!(ToolCatalogAdapter::to_function_schemas(&[]).is_empty());
    }

    #[test]
    fn missing_description_defaults_to_empty_string() {
        let descriptors = vec![ToolDescriptor {
            name: "shell_start".to_string(),
            description: None,
            input_schema: json!({ "type": "object", "properties": { "command": { "type": "string" } } }),
        }];

        let schemas = ToolCatalogAdapter::to_function_schemas(&descriptors);

        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0]["type"], json!("function"));
        assert_eq!(schemas[0]["function"]["name"], json!("shell_start"));
        assert_eq!(schemas[0]["function"]["description"], json!(""));
        // The input schema travels through unchanged.
        assert_eq!(
            schemas[0]["function"]["parameters"],
            descriptors[0].input_schema
        );
    }

    #[test]
    fn assistant_tool_calls_encode_arguments_as_json_string() {
        let mut arguments = JsonMap::new();
        arguments.insert("session_id".to_string(), json!("shell-session-abc123"));
        arguments.insert("input".to_string(), json!("ls\r"));
        let messages = vec![Message::Assistant {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "shell_send".to_string(),
                arguments,
            }],
        }];

        let wire = MessageAdapter::to_openai_format(&messages);

        assert_eq!(wire[0]["role"], json!("assistant"));
        assert_eq!(wire[0]["content"], Value::Null);
        let call = &wire[0]["tool_calls"][0];
        assert_eq!(call["id"], json!("call_1"));
        assert_eq!(call["function"]["name"], json!("shell_send"));
        let encoded = call["function"]["arguments"].as_str().expect("string args");
        let decoded: Value = serde_json::from_str(encoded).expect("round-trips");
        assert_eq!(decoded["input"], json!("ls\r"));
    }

    #[test]
    fn tool_message_carries_tool_call_id() {
        let messages = vec![Message::Tool {
            tool_call_id: "call_9".to_string(),
            content: "{\"success\":true}".to_string(),
        }];

        let wire = MessageAdapter::to_openai_format(&messages);

        assert_eq!(wire[0]["role"], json!("tool"));
        assert_eq!(wire[0]["tool_call_id"], json!("call_9"));
        assert_eq!(wire[0]["content"], json!("{\"success\":true}"));
    }
}
