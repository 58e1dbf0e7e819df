use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to reach tool server: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },
    #[error("tool server returned invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server returned JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("tool server transport error: {message}")]
    Transport { message: String },
}

impl ToolInvokeError {
    /// Whether this failure indicates the server is unreachable rather than
    /// misbehaving.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ToolInvokeError::Http { source } => source.is_connect() || source.is_timeout(),
            ToolInvokeError::Transport { message } => {
                message.to_ascii_lowercase().contains("connect")
            }
            _ => false,
        }
    }
}
