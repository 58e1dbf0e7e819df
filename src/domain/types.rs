use serde_json::{Map as JsonMap, Value};

/// A single tool invocation requested by the model within one assistant turn.
///
/// Arguments stay an opaque ordered mapping; only the dispatcher and the
/// artifact extractor interpret specific keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: JsonMap<String, Value>,
}

/// One entry of the conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// Ordered conversation history driving each completion request.
///
/// Append-only for the lifetime of one run and owned exclusively by the
/// driver executing that run; messages are never reordered.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![
                Message::System {
                    content: system.into(),
                },
                Message::User {
                    content: user.into(),
                },
            ],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

/// Cumulative token usage across one run, folded in by the driver after
/// every completion response. Monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn add(&mut self, other: Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}
