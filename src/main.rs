use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mcp_console::backend::{BackendClient, CommandBackend};
use mcp_console::config::Config;
use mcp_console::console::Console;
use mcp_console::{logging, ui};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mcp-console")]
#[command(version)]
#[command(about = "Send free-text commands to an MCP command backend", long_about = None)]
struct Cli {
    /// Config file (default: ~/.mcp-console/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one command and print the resulting history entry
    Send { text: String },
    /// Resend a logged command by id
    Resend { id: String },
    /// Print the backend's command log
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_base_url_override(cli.base_url);

    match cli.command {
        None => logging::init_file(&Config::log_path()?)?,
        Some(_) => logging::init_stderr(),
    }

    let backend = BackendClient::new(&config.backend)
        .with_context(|| format!("Cannot use backend {}", config.backend.base_url))?;

    match cli.command {
        None => ui::run(config, Arc::new(backend)).await,
        Some(Commands::Send { text }) => send(&backend, text).await,
        Some(Commands::Resend { id }) => resend(&backend, &id).await,
        Some(Commands::History) => history(&backend).await,
    }
}

async fn send(backend: &dyn CommandBackend, text: String) -> Result<()> {
    let mut console = Console::new();
    console.set_input(text);
    console.submit(backend).await;

    let Some(entry) = console.history().latest() else {
        bail!("Nothing to send: the command is blank");
    };
    println!("{}", serde_json::to_string_pretty(entry)?);

    if let Some(error) = &entry.error {
        bail!("{}", error);
    }
    Ok(())
}

async fn resend(backend: &dyn CommandBackend, id: &str) -> Result<()> {
    let mut console = Console::new();
    console.resend(backend, Some(id)).await;

    if let Some(error) = console.error() {
        bail!("{}", error);
    }
    let entry = console
        .history()
        .latest()
        .context("Nothing to resend: the id is empty")?;
    println!("{}", serde_json::to_string_pretty(entry)?);
    Ok(())
}

async fn history(backend: &dyn CommandBackend) -> Result<()> {
    let records = backend
        .recent_commands()
        .await
        .context("Failed to fetch the command log")?;

    if records.is_empty() {
        println!("📭 The backend has no logged commands.");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
