mod errors;
mod models;
mod runner;

#[cfg(test)]
mod tests;

pub use errors::AgentError;
pub use models::{AgentOptions, AgentOutcome, ToolStep};
pub use runner::Agent;
