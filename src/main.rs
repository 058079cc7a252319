use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

mod cli;

use cli::Cli;
use cli::commands::Commands;
use toolbelt::agent::Agent;
use toolbelt::config::Config;
use toolbelt::genai::{ChatSession, generate_json};
use toolbelt::tools::{ToolCatalog, ToolContext, ToolExecutor, ToolInvocation};

/// Level used when `RUST_LOG` is unset; `--verbose` wins over the config
fn log_level(level: Option<&str>, verbose: bool) -> log::LevelFilter {
    if verbose {
        return log::LevelFilter::Debug;
    }
    level.and_then(|l| l.parse().ok()).unwrap_or(log::LevelFilter::Info)
}

fn apply_log_level(level: Option<&str>, verbose: bool) {
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log_level(level, verbose));
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolbelt")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolbelt.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Filter wide open; the effective level is narrowed by apply_log_level once config is known
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .target(env_logger::Target::Pipe(target))
        .init();
    apply_log_level(None, verbose);

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Tools { declarations } => handle_tools_command(*declarations),
        Commands::Call { tool, args } => handle_call_command(tool, args.as_deref(), config).await,
        Commands::Chat { model } => handle_chat_command(model.as_deref(), config).await,
        Commands::Generate { schema, prompt } => handle_generate_command(schema, prompt, config).await,
        Commands::Agent { prompt, max_turns } => handle_agent_command(prompt, *max_turns, cli.is_verbose(), config).await,
    }
}

fn handle_tools_command(declarations: bool) -> Result<()> {
    let catalog = ToolCatalog::global();
    let schemas = if declarations {
        catalog.to_function_declarations()
    } else {
        catalog.to_schemas()
    };
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

/// Tool context with a Gemini client attached when an API key is available
fn tool_context(config: &Config) -> Result<ToolContext> {
    let ctx = config.tool_context()?;
    match config.gemini_client() {
        Ok(client) => Ok(ctx.with_genai(client)),
        Err(e) => {
            log::debug!("Running tools without a generative-AI client: {:#}", e);
            Ok(ctx)
        }
    }
}

async fn handle_call_command(tool: &str, args: Option<&str>, config: &Config) -> Result<()> {
    info!("Calling tool {}", tool);

    let arguments: Value = match args {
        Some(json) => serde_json::from_str(json).context("--args must be valid JSON")?,
        None => Value::Null,
    };
    let invocation = ToolInvocation::from_json(tool, arguments)?;
    let ctx = tool_context(config)?;

    let output = ToolExecutor::standard()
        .execute(&invocation, &ctx)
        .await
        .context(format!("Tool {} failed", tool))?;

    println!("{}", serde_json::to_string_pretty(&output.to_json())?);
    Ok(())
}

async fn handle_chat_command(model: Option<&str>, config: &Config) -> Result<()> {
    let client = config.gemini_client()?;
    let model = model.unwrap_or(&config.genai.chat_model);
    let mut session = ChatSession::new(client, model);

    println!("{} {} (type 'exit' to quit)", "Chatting with".green(), model);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match session.send_message(line).await {
            Ok(reply) => println!("{} {}", "model:".cyan(), reply),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
    }

    info!("Chat ended after {} turns", session.len());
    Ok(())
}

async fn handle_generate_command(schema: &Path, prompt: &str, config: &Config) -> Result<()> {
    let schema_text = fs::read_to_string(schema).context(format!("Failed to read schema {}", schema.display()))?;
    let schema: Value = serde_json::from_str(&schema_text).context("Schema file is not valid JSON")?;

    let client = config.gemini_client()?;
    let value: Value = generate_json(client.as_ref(), &config.genai.chat_model, prompt, schema).await?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn handle_agent_command(prompt: &str, max_turns: Option<usize>, verbose: bool, config: &Config) -> Result<()> {
    let client = config.gemini_client()?;
    let ctx = config.tool_context()?.with_genai(client.clone());
    let agent = Agent::new(client, ctx)
        .with_model(&config.genai.chat_model)
        .with_max_turns(max_turns.unwrap_or(config.agent.max_turns));

    let reply = agent.run(prompt).await?;

    if verbose {
        for call in &reply.tool_calls {
            let marker = if call.is_error { "✗".red() } else { "✓".green() };
            eprintln!("{} {} {}", marker, call.name.bold(), call.args);
        }
    }

    println!("{}", reply.text);

    if reply.exhausted {
        eprintln!(
            "{}",
            format!("Stopped after {} turns without a final answer", reply.turns).yellow()
        );
    }
    info!(
        "Agent used {} tool call(s), {} tokens",
        reply.tool_calls.len(),
        reply.usage.total()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(config.log_level.as_deref(), cli.is_verbose());

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
