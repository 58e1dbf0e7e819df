use std::path::PathBuf;

use serde_json::{Map as JsonMap, Value};

use crate::domain::{Transcript, Usage};

#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub system_prompt: Option<String>,
    /// Operator-level hardening cap on model turns. `None` leaves
    /// termination entirely to the model.
    pub max_turns: Option<usize>,
}

/// Record of one dispatched tool call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolStep {
    pub tool: String,
    pub arguments: JsonMap<String, Value>,
    pub output: String,
    pub artifacts: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct AgentOutcome {
    pub response: String,
    pub usage: Usage,
    pub steps: Vec<ToolStep>,
    pub transcript: Transcript,
}
