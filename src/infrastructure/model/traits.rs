//! Model traits

use async_trait::async_trait;

use super::types::{ModelError, ModelRequest, ModelResponse};

/// Trait for model provider implementations
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Submit a transcript and tool catalog, receive the next message.
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
