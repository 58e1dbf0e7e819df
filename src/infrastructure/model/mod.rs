mod adapter;
mod openai;
mod traits;
mod types;

pub use adapter::{MessageAdapter, ToolCatalogAdapter};
pub use openai::OpenAIClient;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse};
