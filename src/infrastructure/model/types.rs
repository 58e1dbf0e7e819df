//! Model types - Request, Response, and Error types

use serde_json::Value;
use thiserror::Error;

use crate::domain::{Message, ToolCallRequest, Usage};

/// One completion request: the full transcript plus the tool catalog.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<Value>,
}

/// The model's next message, split into plain content and requested tool
/// calls, with the usage numbers reported for this round trip.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Usage,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error calling model endpoint: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },
    #[error("model endpoint returned invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl ModelError {
    pub fn network(source: reqwest::Error) -> Self {
        Self::Network { source }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Whether this failure indicates the endpoint is unreachable.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ModelError::Network { source } => source.is_connect() || source.is_timeout(),
            ModelError::InvalidResponse { .. } => false,
        }
    }
}
