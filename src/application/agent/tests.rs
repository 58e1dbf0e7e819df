use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value, json};
use tokio::sync::Mutex;

use super::*;
use crate::application::artifacts::{ArtifactError, ArtifactExtractor, ArtifactFetcher};
use crate::application::tooling::{ToolDescriptor, ToolInvokeError, ToolServerInterface};
use crate::domain::{Message, ToolCallRequest, Usage};
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<ModelResponse>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let mut responses = self.responses.lock().await;
        let response = responses.remove(0);
        let mut recordings = self.recordings.lock().await;
        recordings.push(request);
        Ok(response)
    }
}

struct StubBridge {
    result: Value,
    failure: Option<(i64, String)>,
    invocations: Arc<Mutex<Vec<String>>>,
}

impl StubBridge {
    fn returning(result: Value) -> Self {
        Self {
            result,
            failure: None,
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(code: i64, message: &str) -> Self {
        Self {
            result: Value::Null,
            failure: Some((code, message.to_string())),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ToolServerInterface for StubBridge {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        Ok(Vec::new())
    }

    async fn call_tool(&self, tool: &str, _arguments: Value) -> Result<Value, ToolInvokeError> {
        self.invocations.lock().await.push(tool.to_string());
        if let Some((code, message)) = &self.failure {
            return Err(ToolInvokeError::Rpc {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(self.result.clone())
    }
}

struct NullFetcher;

#[async_trait]
impl ArtifactFetcher for NullFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ArtifactError> {
        Err(ArtifactError::Fetch {
            url: url.to_string(),
            message: "no fetches expected".to_string(),
        })
    }
}

fn text_result(text: &str) -> Value {
    json!({ "content": [{ "type": "text", "text": text }], "isError": false })
}

fn tool_call(id: &str, name: &str) -> ToolCallRequest {
    let mut arguments = JsonMap::new();
    arguments.insert("session_id".to_string(), json!("shell-session-ab12cd"));
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

fn final_response(content: &str, usage: Usage) -> ModelResponse {
    ModelResponse {
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
        usage,
    }
}

fn tool_response(calls: Vec<ToolCallRequest>, usage: Usage) -> ModelResponse {
    ModelResponse {
        content: None,
        tool_calls: calls,
        usage,
    }
}

fn usage(input: u64, output: u64) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
    }
}

fn agent_in(
    dir: &std::path::Path,
    provider: ScriptedProvider,
    bridge: StubBridge,
) -> Agent<ScriptedProvider> {
    Agent::new(
        provider,
        Arc::new(bridge),
        ArtifactExtractor::new(Arc::new(NullFetcher), dir),
        Vec::new(),
        "gpt-test".to_string(),
    )
}

#[tokio::test]
async fn run_without_tool_calls_terminates_immediately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = ScriptedProvider::new(vec![final_response("done", usage(3, 5))]);
    let agent = agent_in(dir.path(), provider.clone(), StubBridge::returning(Value::Null));

    let outcome = agent
        .run("open vim".to_string(), AgentOptions::default())
        .await
        .expect("run succeeds");

    assert_eq!(outcome.response, "done");
    assert!(outcome.steps.is_empty());
    assert_eq!(outcome.usage, usage(3, 5));
    // Only the system and user messages ever entered the transcript.
    assert_eq!(outcome.transcript.len(), 2);
    // No further completion request was issued after the final answer.
    assert_eq!(provider.requests().await.len(), 1);
}

#[tokio::test]
async fn tool_calls_dispatch_strictly_in_emission_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = ScriptedProvider::new(vec![
        tool_response(
            vec![
                tool_call("call_1", "shell_start"),
                tool_call("call_2", "shell_send"),
                tool_call("call_3", "shell_read"),
            ],
            usage(10, 2),
        ),
        final_response("all done", usage(4, 1)),
    ]);
    let bridge = StubBridge::returning(text_result("{\"success\":true}"));
    let invocations = bridge.invocations.clone();
    let agent = agent_in(dir.path(), provider.clone(), bridge);

    let outcome = agent
        .run("poke the shell".to_string(), AgentOptions::default())
        .await
        .expect("run succeeds");

    assert_eq!(
        *invocations.lock().await,
        vec!["shell_start", "shell_send", "shell_read"]
    );

    // system, user, assistant, then exactly one tool message per call.
    let messages = outcome.transcript.messages();
    assert_eq!(messages.len(), 6);
    let ids: Vec<&str> = messages
        .iter()
        .filter_map(|message| match message {
            Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["call_1", "call_2", "call_3"]);

    // The second completion request already carried the appended turn.
    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[1].messages.len(), 6);
}

#[tokio::test]
async fn usage_accumulates_across_turns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![tool_call("call_1", "shell_start")], usage(3, 5)),
        tool_response(vec![tool_call("call_2", "shell_send")], usage(2, 1)),
        final_response("finished", usage(0, 4)),
    ]);
    let agent = agent_in(
        dir.path(),
        provider,
        StubBridge::returning(text_result("ok")),
    );

    let outcome = agent
        .run("run ls".to_string(), AgentOptions::default())
        .await
        .expect("run succeeds");

    assert_eq!(outcome.usage, usage(5, 10));
    assert_eq!(outcome.steps.len(), 2);
}

#[tokio::test]
async fn tool_failure_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = ScriptedProvider::new(vec![tool_response(
        vec![tool_call("call_1", "shell_send")],
        usage(1, 1),
    )]);
    let agent = agent_in(
        dir.path(),
        provider,
        StubBridge::failing(-32000, "Session not found: shell-session-ab12cd"),
    );

    let error = agent
        .run("type hello".to_string(), AgentOptions::default())
        .await
        .expect_err("run aborts");

    assert!(matches!(
        error,
        AgentError::Tool(ToolInvokeError::Rpc { .. })
    ));
}

#[tokio::test]
async fn turn_limit_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = ScriptedProvider::new(vec![tool_response(
        vec![tool_call("call_1", "shell_read")],
        usage(1, 1),
    )]);
    let agent = agent_in(
        dir.path(),
        provider,
        StubBridge::returning(text_result("ok")),
    );

    let error = agent
        .run(
            "loop forever".to_string(),
            AgentOptions {
                max_turns: Some(1),
                ..AgentOptions::default()
            },
        )
        .await
        .expect_err("run aborts");

    assert!(matches!(error, AgentError::TurnLimit { limit: 1 }));
}

#[tokio::test]
async fn inline_artifacts_are_stripped_before_entering_the_transcript() {
    use base64::Engine as _;

    let dir = tempfile::tempdir().expect("tempdir");
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"png bytes");
    let provider = ScriptedProvider::new(vec![
        tool_response(vec![tool_call("call_1", "shell_screenshot")], usage(1, 1)),
        final_response("saved it", usage(1, 1)),
    ]);
    let screenshot = json!({ "base64": encoded, "filename": "shot.png" }).to_string();
    let agent = agent_in(
        dir.path(),
        provider,
        StubBridge::returning(text_result(&screenshot)),
    );

    let outcome = agent
        .run("screenshot the shell".to_string(), AgentOptions::default())
        .await
        .expect("run succeeds");

    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].artifacts, vec![dir.path().join("shot.png")]);
    assert_eq!(
        std::fs::read(dir.path().join("shot.png")).expect("artifact on disk"),
        b"png bytes"
    );

    let tool_message = outcome
        .transcript
        .messages()
        .iter()
        .find_map(|message| match message {
            Message::Tool { content, .. } => Some(content.clone()),
            _ => None,
        })
        .expect("tool message present");
    let rewritten: Value = serde_json::from_str(&tool_message).expect("still JSON");
    assert!(rewritten.get("base64").is_none());
    assert_eq!(rewritten["saved"], json!(true));
}
