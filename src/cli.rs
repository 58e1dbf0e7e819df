use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shellwright-agent",
    version,
    about = "Drive terminal applications with natural language through a Shellwright server"
)]
pub struct Cli {
    /// Instruction for the agent; read interactively when omitted
    pub prompt: Vec<String>,
    /// Shellwright server base URL (overrides SHELLWRIGHT_URL)
    #[arg(long)]
    pub server_url: Option<String>,
    /// Model API base URL (overrides OPENAI_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,
    /// Model identifier (overrides OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,
    /// Directory for saved screenshots and recordings (overrides SHELLWRIGHT_OUTPUT)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Replace the built-in system prompt
    #[arg(long)]
    pub system: Option<String>,
    /// Abort after this many model turns (no limit by default)
    #[arg(long)]
    pub max_turns: Option<usize>,
}
