//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::adapter::MessageAdapter;
use super::traits::ModelProvider;
use super::types::{ModelError, ModelRequest, ModelResponse};
use crate::domain::{ToolCallRequest, Usage};

/// Chat-completions client (works with OpenAI and compatible endpoints).
#[derive(Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let payload = WireRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.messages),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.clone())
            },
            tool_choice: if request.tools.is_empty() {
                None
            } else {
                Some("auto")
            },
            stream: false,
        };

        info!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            "sending completion request"
        );

        let response: WireResponse = self
            .http
            .post(self.build_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(ModelError::network)?
            .error_for_status()
            .map_err(ModelError::network)?
            .json()
            .await
            .map_err(ModelError::network)?;
        debug!("received completion response");

        parse_response(response)
    }
}

fn parse_response(response: WireResponse) -> Result<ModelResponse, ModelError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| ModelError::invalid_response("missing message in choices"))?;

    let mut tool_calls = Vec::new();
    for call in message.tool_calls {
        let trimmed = call.function.arguments.trim();
        let arguments = if trimmed.is_empty() {
            serde_json::Map::new()
        } else {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) => map,
                _ => {
                    return Err(ModelError::invalid_response(format!(
                        "tool call '{}' arguments are not a JSON object",
                        call.function.name
                    )));
                }
            }
        };
        tool_calls.push(ToolCallRequest {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    let usage = response
        .usage
        .map(|usage| Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
        .unwrap_or_default();

    Ok(ModelResponse {
        content: message.content,
        tool_calls,
        usage,
    })
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    stream: bool,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
