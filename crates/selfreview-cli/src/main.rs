//! selfreview CLI - MCP server for working on your own GitHub pull requests.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use selfreview_core::config::Config;
use selfreview_core::{parse_pr_reference, PullRequestResolver};
use selfreview_github::{GitHubClient, DEFAULT_GITHUB_URL};
use selfreview_mcp::{McpServer, StdioTransport, ToolHandler};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "selfreview")]
#[command(author, version, long_about = None)]
#[command(about = "MCP server for reviewing your own pull requests")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout (default)
    Serve {
        /// GitHub API base URL (GitHub Enterprise)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Resolve a pull request URL to owner, repository and number
    ParseUrl {
        /// Pull request URL
        url: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value (e.g. github.base_url)
    Get { key: String },

    /// Set a configuration value (e.g. github.base_url https://ghe.example.com/api/v3)
    Set { key: String, value: String },

    /// Print the configuration file path
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let result = runtime.block_on(run(cli));

    // The stdin reader may still be parked in a blocking read after a
    // signal; exit without joining it.
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { base_url: None }) {
        Commands::Serve { base_url } => serve(cli.config, base_url).await,
        Commands::Config { command } => run_config(cli.config, command),
        Commands::ParseUrl { url } => {
            let reference = parse_pr_reference(&url)?;
            println!("{}", serde_json::to_string_pretty(&reference)?);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries the protocol stream.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn config_path(custom: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match custom {
        Some(path) => Ok(path),
        None => Ok(Config::config_path()?),
    }
}

fn load_config(custom: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = config_path(custom)?;
    Config::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Build the GitHub client from config, with the command-line base URL winning.
fn build_client(config: &Config, base_url: Option<String>, token: String) -> GitHubClient {
    let base_url = base_url
        .or_else(|| config.github.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GITHUB_URL.to_string());

    let client = GitHubClient::with_base_url(base_url, token);
    match &config.github.user_agent {
        Some(user_agent) => client.with_user_agent(user_agent.clone()),
        None => client,
    }
}

async fn serve(config_file: Option<PathBuf>, base_url: Option<String>) -> anyhow::Result<()> {
    let config = load_config(config_file)?;
    let token = Config::token_from_env().context("Cannot start the MCP server")?;

    let client = build_client(&config, base_url, token);
    let base_url = client.base_url().to_string();

    let resolver = PullRequestResolver::new(Arc::new(client));
    tracing::info!(provider = resolver.provider_name(), base_url = %base_url, "API client ready");
    let mut server = McpServer::new(ToolHandler::new(resolver));
    let mut transport = StdioTransport::stdio();

    server
        .run(&mut transport, shutdown_signal()?)
        .await
        .context("MCP server failed")?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    // Both handlers are registered before the server starts reading
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::info!("Received SIGINT"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
        }
    })
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C");
        }
    })
}

fn run_config(config_file: Option<PathBuf>, command: ConfigCommands) -> anyhow::Result<()> {
    let path = config_path(config_file)?;

    match command {
        ConfigCommands::Show => {
            let config = Config::load_from(&path)?;
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_from(&path)?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => anyhow::bail!("{} is not set", key),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(&path)?;
            config.set(&key, &value)?;
            config.save_to(&path)?;
            println!("Set {} in {}", key, path.display());
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }

    Ok(())
}
