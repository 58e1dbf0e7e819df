//! Failure normalization for the operator.
//!
//! A run aborts with a single top-level error that may wrap an arbitrary
//! chain of causes. Before anything is printed, the chain is flattened into
//! elementary entries, and connectivity failures are singled out so the
//! operator sees "the server is not running" instead of a transport trace.

use std::error::Error;

use super::agent::AgentError;

/// One flattened failure: a short type tag plus its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementaryError {
    pub kind: String,
    pub message: String,
}

/// Flatten an agent failure and its `source()` chain, outermost first.
pub fn normalize(error: &AgentError) -> Vec<ElementaryError> {
    let mut flattened = vec![ElementaryError {
        kind: error.kind().to_string(),
        message: error.to_string(),
    }];
    let mut source = error.source();
    while let Some(cause) = source {
        flattened.push(ElementaryError {
            kind: "caused-by".to_string(),
            message: cause.to_string(),
        });
        source = cause.source();
    }
    flattened
}

/// Whether the failure means the remote service or model endpoint is
/// unreachable. Checks the transport layer's own probes first, then falls
/// back to a textual match over the flattened chain.
pub fn is_connectivity(error: &AgentError) -> bool {
    let structured = match error {
        AgentError::Model(err) => err.is_connectivity(),
        AgentError::Tool(err) => err.is_connectivity(),
        AgentError::TurnLimit { .. } => false,
    };
    structured
        || normalize(error)
            .iter()
            .any(|entry| entry.message.to_ascii_lowercase().contains("connect"))
}
