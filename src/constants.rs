//! Application constants: default endpoints, model, output directory, and the
//! default system prompt. Values are pinned by SPEC_FULL.md §6 and the original
//! `demo/demo.py` driver.

/// Default Shellwright MCP server URL (`SHELLWRIGHT_URL`).
pub const DEFAULT_SERVER_URL: &str = "http://localhost:7498";

/// Default artifact output directory (`SHELLWRIGHT_OUTPUT`).
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default OpenAI-compatible base URL (`OPENAI_BASE_URL`).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model identifier (`OPENAI_MODEL`).
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default system prompt describing terminal-control key sequences.
pub const SYSTEM_PROMPT: &str = "You control terminal applications using Shellwright tools.\n\nKey sequences: arrow keys (\\x1b[A/B/C/D), Enter (\\r), Escape (\\x1b), Ctrl+C (\\x03)\nUse descriptive names for screenshots and recordings.";
