use thiserror::Error;

use crate::application::tooling::ToolInvokeError;
use crate::infrastructure::model::ModelError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolInvokeError),
    #[error("run exceeded the configured limit of {limit} model turns")]
    TurnLimit { limit: usize },
}

impl AgentError {
    /// Short tag used when the failure is rendered to the operator.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Model(_) => "model",
            AgentError::Tool(_) => "tool",
            AgentError::TurnLimit { .. } => "turn-limit",
        }
    }
}
