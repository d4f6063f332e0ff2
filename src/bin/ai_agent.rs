//! ai-agent — natural-language front end for the target REST API
//!
//! Usage:
//!   ai-agent ask <text...>          Run one request and print the reply
//!   ai-agent chat                   Interactive session, one conversation
//!   ai-agent operations             List the operation catalog
//!
//! All commands accept `--config <file.yaml>`; otherwise settings come from
//! the environment.

use ai_api_agent::{Agent, AgentConfig, ConversationStore, InMemoryConversationStore};
use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "ask" => cmd_ask(&args[2..]).await,
        "chat" => cmd_chat(&args[2..]).await,
        "operations" | "ops" => cmd_operations(&args[2..]),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"ai-agent — natural-language commands for the project API

USAGE:
    ai-agent <COMMAND> [OPTIONS]

COMMANDS:
    ask <text...>               Run one request and print the reply as JSON
    chat                        Read requests from stdin in one conversation
    operations                  List the supported operations
    version                     Show version information
    help                        Show this help message

OPTIONS:
    --config <file.yaml>        Load settings from a YAML file

ENVIRONMENT:
    LLM_PROVIDER, LLM_MODEL, LLM_API_KEY, LLM_API_BASE, LLM_MAX_TOKENS,
    LLM_TEMPERATURE, LLM_TIMEOUT, API_BASE_URL, API_KEY, API_TIMEOUT,
    API_RETRY_ATTEMPTS, API_RETRY_DELAY, LOG_LEVEL, RUST_LOG"#
    );
}

fn cmd_version() {
    println!("ai-agent {}", env!("CARGO_PKG_VERSION"));
}

fn init_logging() {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Splits `--config <path>` out of the argument list.
fn split_config(args: &[String]) -> anyhow::Result<(Option<String>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            match iter.next() {
                Some(path) => config = Some(path.clone()),
                None => bail!("--config requires a file path"),
            }
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config, rest))
}

fn load_config(path: Option<&str>) -> anyhow::Result<AgentConfig> {
    match path {
        Some(path) => AgentConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {path}")),
        None => Ok(AgentConfig::from_env()),
    }
}

async fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let (config_path, words) = split_config(args)?;
    if words.is_empty() {
        bail!("ask requires a request, e.g. `ai-agent ask list all my projects`");
    }
    init_logging();

    let agent = Agent::new(&load_config(config_path.as_deref())?)?;
    let reply = agent.process_text(&words.join(" "), &[]).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    if !reply.success {
        std::process::exit(2);
    }
    Ok(())
}

async fn cmd_chat(args: &[String]) -> anyhow::Result<()> {
    let (config_path, _) = split_config(args)?;
    init_logging();

    let agent = Agent::new(&load_config(config_path.as_deref())?)?;
    let store = InMemoryConversationStore::new();
    let conversation = store.create().await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "exit" | "quit") {
            break;
        }
        let reply = agent
            .process_in_conversation(&store, &conversation, text)
            .await;
        stdout.write_all(format!("{}\n", reply.message).as_bytes()).await?;
    }
    Ok(())
}

fn cmd_operations(args: &[String]) -> anyhow::Result<()> {
    let (config_path, _) = split_config(args)?;
    let agent = Agent::new(&load_config(config_path.as_deref())?)?;

    println!("{:<24} {:<7} {:<48} REQUIRED", "OPERATION", "METHOD", "PATH");
    println!("{}", "-".repeat(100));
    for op in agent.registry().list() {
        println!(
            "{:<24} {:<7} {:<48} {}",
            op.id,
            op.method.as_str(),
            op.path_template,
            op.required_params.join(", ")
        );
    }
    Ok(())
}
