use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is required - set it in the environment or a .env file")]
    MissingApiKey,

    #[error("failed to read configuration input: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}
