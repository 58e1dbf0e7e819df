mod application;
mod cli;
mod config;
mod constants;
mod domain;
mod infrastructure;

use std::io::{self, Read};
use std::process;
use std::sync::Arc;

use clap::Parser;
use crossterm::style::Stylize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use application::agent::{Agent, AgentError, AgentOptions, AgentOutcome};
use application::artifacts::{ArtifactExtractor, HttpFetcher};
use application::reporting;
use application::tooling::{McpHttpClient, ToolServerInterface};
use cli::Cli;
use config::AppConfig;
use infrastructure::model::{OpenAIClient, ToolCatalogAdapter};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match AppConfig::resolve(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    log_config(&config);

    let prompt = match load_prompt(&cli) {
        Ok(prompt) => prompt,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = tokio::fs::create_dir_all(&config.output_dir).await {
        eprintln!(
            "Error: cannot create output directory {}: {err}",
            config.output_dir.display()
        );
        process::exit(1);
    }

    match run(prompt, &cli, &config).await {
        Ok(outcome) => {
            info!(messages = outcome.transcript.len(), "run complete");
            report_outcome(&outcome);
        }
        Err(err) => {
            report_failure(&err, &config);
            process::exit(1);
        }
    }
}

async fn run(prompt: String, cli: &Cli, config: &AppConfig) -> Result<AgentOutcome, AgentError> {
    let bridge: Arc<dyn ToolServerInterface> =
        Arc::new(McpHttpClient::connect(&config.server_url).await?);
    let descriptors = bridge.list_tools().await?;
    info!(tools = descriptors.len(), "tool catalogue loaded");
    let tools = ToolCatalogAdapter::to_function_schemas(&descriptors);

    let provider = OpenAIClient::new(config.base_url.clone(), config.api_key.clone());
    let extractor = ArtifactExtractor::new(
        Arc::new(HttpFetcher::new()),
        config.output_dir.clone(),
    );
    let agent = Agent::new(provider, bridge, extractor, tools, config.model.clone());

    let options = AgentOptions {
        system_prompt: cli.system.clone(),
        max_turns: cli.max_turns,
    };
    agent.run(prompt, options).await
}

fn report_outcome(outcome: &AgentOutcome) {
    for path in outcome.steps.iter().flat_map(|step| &step.artifacts) {
        println!("{} {}", "saved:".green(), path.display());
    }
    println!("\n{}", outcome.response);
    println!(
        "{}",
        format!(
            "usage: {} input / {} output tokens",
            outcome.usage.input_tokens, outcome.usage.output_tokens
        )
        .dim()
    );
}

fn report_failure(error: &AgentError, config: &AppConfig) {
    if reporting::is_connectivity(error) {
        eprintln!(
            "Error: Shellwright server not running at {} - start it with 'shellwright --http'",
            config.server_url
        );
        return;
    }
    for entry in reporting::normalize(error) {
        eprintln!("{}: {}", entry.kind, entry.message);
    }
}

fn log_config(config: &AppConfig) {
    println!("{} {}", "shellwright:".dim(), config.server_url);
    println!("{} {}", "base_url:".dim(), config.base_url);
    println!("{} {}", "api_key:".dim(), config.masked_key());
    println!("{} {}", "model:".dim(), config.model);
    println!("{} {}", "output:".dim(), config.output_dir.display());
    println!();
}

fn load_prompt(cli: &Cli) -> Result<String, io::Error> {
    if !cli.prompt.is_empty() {
        return Ok(cli.prompt.join(" ").trim().to_string());
    }

    if !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        let prompt = buffer.trim().to_string();
        if prompt.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "instruction required via arguments or stdin",
            ));
        }
        return Ok(prompt);
    }

    print!("{} ", "User (enter message):".dim());
    io::Write::flush(&mut io::stdout())?;
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    let prompt = buffer.trim().to_string();
    if prompt.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "instruction required",
        ));
    }
    Ok(prompt)
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
