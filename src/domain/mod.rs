mod types;

pub use types::{Message, ToolCallRequest, Transcript, Usage};
