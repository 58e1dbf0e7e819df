//! Runtime configuration resolved from flags, environment variables, and -
//! when the terminal is interactive - operator prompts.

mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Once;

use crossterm::style::Stylize;
use tracing::debug;

pub use error::ConfigError;

use crate::cli::Cli;
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR, DEFAULT_SERVER_URL,
};

static ENV_LOADER: Once = Once::new();

/// Ensures environment variables are loaded from a .env file once.
fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AppConfig {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        ensure_env_loaded();
        let interactive = atty::is(atty::Stream::Stdin);
        Self::resolve_with(cli, &|name| std::env::var(name).ok(), interactive)
    }

    fn resolve_with(
        cli: &Cli,
        env: &dyn Fn(&str) -> Option<String>,
        interactive: bool,
    ) -> Result<Self, ConfigError> {
        let server_url = cli
            .server_url
            .clone()
            .or_else(|| env("SHELLWRIGHT_URL"))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let output_dir = cli
            .output
            .clone()
            .or_else(|| env("SHELLWRIGHT_OUTPUT").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let base_url = match cli.base_url.clone().or_else(|| env("OPENAI_BASE_URL")) {
            Some(url) => url,
            None if interactive => prompt_line(&format!("Base URL [{DEFAULT_BASE_URL}]:"))?
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            None => DEFAULT_BASE_URL.to_string(),
        };

        let api_key = match env("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()) {
            Some(key) => key,
            None if interactive => {
                prompt_line("API Key (required):")?.ok_or(ConfigError::MissingApiKey)?
            }
            None => return Err(ConfigError::MissingApiKey),
        };

        let model = match cli.model.clone().or_else(|| env("OPENAI_MODEL")) {
            Some(model) => model,
            None if interactive => prompt_line(&format!("Model [{DEFAULT_MODEL}]:"))?
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            None => DEFAULT_MODEL.to_string(),
        };

        debug!(server_url = server_url.as_str(), model = model.as_str(), "configuration resolved");
        Ok(Self {
            server_url,
            output_dir,
            base_url,
            api_key,
            model,
        })
    }

    /// API key masked for display.
    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

fn prompt_line(label: &str) -> Result<Option<String>, ConfigError> {
    print!("{} ", label.dim());
    io::stdout()
        .flush()
        .map_err(|source| ConfigError::Io { source })?;
    let mut buffer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut buffer)
        .map_err(|source| ConfigError::Io { source })?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn mask_key(key: &str) -> String {
    if key.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}**...")
}
