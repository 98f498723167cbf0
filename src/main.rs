mod cli;

use clap::Parser;
use cli::Cli;
use datagouv_assistant::agent::{Agent, AgentOptions};
use datagouv_assistant::config::AppConfig;
use datagouv_assistant::mcp::McpHttpClient;
use datagouv_assistant::model::GeminiBackend;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let question = cli.question();
    if question.trim().is_empty() {
        eprintln!("Posez une question sur les données publiques françaises.");
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.user_message());
            return ExitCode::FAILURE;
        }
    };
    debug!(endpoint = config.endpoint.as_str(), model = config.model.as_str(), "Configuration loaded");

    let endpoint = cli.endpoint.clone().unwrap_or_else(|| config.endpoint.clone());
    let model = cli.model.clone().unwrap_or_else(|| config.model.clone());

    let client = Arc::new(McpHttpClient::new(endpoint).with_timeout(config.request_timeout));
    let backend = GeminiBackend::new(model, config.resolve_api_key());
    let agent = Agent::new(backend, client, config.system_prompt.clone())
        .with_catalog_ttl(config.catalog_ttl);

    let options = AgentOptions {
        system_prompt: cli.system.clone(),
        max_tool_rounds: cli.max_tool_rounds.unwrap_or(config.max_tool_rounds),
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    info!("Dispatching question to agent");
    match agent.ask(question, options).await {
        Ok(outcome) => {
            let output = json!({
                "answer": outcome.answer,
                "tool_steps": outcome.steps,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(rendered) => println!("{rendered}"),
                Err(_) => println!("{}", outcome.answer),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
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
