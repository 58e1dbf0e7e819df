use std::sync::Arc;

use serde_json::{Map as JsonMap, Value};
use tracing::{debug, info};

use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, ToolStep};
use crate::application::artifacts::ArtifactExtractor;
use crate::application::tooling::{ToolRuntime, ToolServerInterface};
use crate::constants;
use crate::domain::{Message, ToolCallRequest, Transcript, Usage};
use crate::infrastructure::model::{ModelProvider, ModelRequest};

/// Per-turn state of the conversation driver.
///
/// The run suspends only at the three named points: the completion request
/// (`AwaitingModel`), each tool invocation, and each artifact write
/// (`DispatchingTools`). Between suspensions, transcript mutation is
/// synchronous. Tool calls are never dispatched concurrently, which is what
/// upholds the transcript ordering invariant without any locking.
enum TurnState {
    AwaitingModel,
    DispatchingTools(Vec<ToolCallRequest>),
}

pub struct Agent<P: ModelProvider> {
    provider: P,
    runtime: ToolRuntime,
    extractor: ArtifactExtractor,
    tools: Vec<Value>,
    model: String,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(
        provider: P,
        bridge: Arc<dyn ToolServerInterface>,
        extractor: ArtifactExtractor,
        tools: Vec<Value>,
        model: String,
    ) -> Self {
        Self {
            provider,
            runtime: ToolRuntime::new(bridge),
            extractor,
            tools,
            model,
        }
    }

    /// Drive one instruction to a final answer.
    ///
    /// The transcript is owned here for the lifetime of the run; it grows by
    /// exactly one assistant message plus one tool message per requested
    /// call each turn, in the order the model emitted the calls.
    pub async fn run(
        &self,
        prompt: String,
        options: AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        let system_prompt = options
            .system_prompt
            .unwrap_or_else(|| constants::SYSTEM_PROMPT.to_string());
        let mut transcript = Transcript::new(system_prompt, prompt);
        let mut usage = Usage::default();
        let mut steps: Vec<ToolStep> = Vec::new();
        let mut completed_turns = 0usize;
        let mut state = TurnState::AwaitingModel;

        info!(model = self.model.as_str(), "agent run started");
        loop {
            state = match state {
                TurnState::AwaitingModel => {
                    if let Some(limit) = options.max_turns {
                        if completed_turns >= limit {
                            return Err(AgentError::TurnLimit { limit });
                        }
                    }
                    debug!(messages = transcript.len(), "submitting transcript to model");
                    let response = self
                        .provider
                        .chat(ModelRequest {
                            model: self.model.clone(),
                            messages: transcript.messages().to_vec(),
                            tools: self.tools.clone(),
                        })
                        .await?;
                    usage.add(response.usage);
                    completed_turns += 1;

                    if response.tool_calls.is_empty() {
                        info!(
                            turns = completed_turns,
                            tool_calls = steps.len(),
                            "model returned final answer"
                        );
                        return Ok(AgentOutcome {
                            response: response.content.unwrap_or_default(),
                            usage,
                            steps,
                            transcript,
                        });
                    }

                    transcript.push(Message::Assistant {
                        content: response.content,
                        tool_calls: response.tool_calls.clone(),
                    });
                    TurnState::DispatchingTools(response.tool_calls)
                }
                TurnState::DispatchingTools(calls) => {
                    // Strictly in the order the model emitted them.
                    for call in calls {
                        info!(
                            tool = call.name.as_str(),
                            args = preview_arguments(&call.arguments).as_str(),
                            "tool call"
                        );
                        let raw = self
                            .runtime
                            .invoke(&call.name, Value::Object(call.arguments.clone()))
                            .await?;
                        info!(response = preview_result(&raw).as_str(), "tool response");

                        let extraction = self.extractor.process(&raw).await;
                        steps.push(ToolStep {
                            tool: call.name,
                            arguments: call.arguments,
                            output: extraction.text.clone(),
                            artifacts: extraction.saved,
                        });
                        transcript.push(Message::Tool {
                            tool_call_id: call.id,
                            content: extraction.text,
                        });
                    }
                    TurnState::AwaitingModel
                }
            };
        }
    }
}

/// Compact argument preview for logs: the session handle is noise and long
/// values drown the line.
fn preview_arguments(arguments: &JsonMap<String, Value>) -> String {
    let mut parts = Vec::new();
    for (key, value) in arguments {
        if key == "session_id" {
            continue;
        }
        let rendered = match value {
            Value::String(text) => format!("{:?}", crop(text, 30)),
            other => other.to_string(),
        };
        parts.push(format!("{key}={rendered}"));
    }
    parts.join(", ")
}

/// Compact result preview for logs, with inline payloads cropped.
fn preview_result(text: &str) -> String {
    if let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(text) {
        if let Some(encoded) = object.get("base64").and_then(Value::as_str) {
            let prefix: String = encoded.chars().take(20).collect();
            object.insert(
                "base64".to_string(),
                Value::String(format!("{prefix}...[cropped]")),
            );
        }
        return crop(&Value::Object(object).to_string(), 100);
    }
    crop(text, 100)
}

fn crop(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    format!("{truncated}...")
}
