//! igview CLI
//!
//! Runs the Instagram profile viewer backend, or performs one-off lookups
//! against the IMAI API and prints the normalized JSON the server would return.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use igview_api::{normalize, ApiConfig, ApiServer};
use igview_upstream::{ImaiClient, ImaiConfig};

/// igview - Instagram profile viewer backend
#[derive(Parser)]
#[command(name = "igview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on (defaults to $PORT, then 3000)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Search users by keyword
    Search {
        /// Search keyword
        query: String,
    },

    /// Fetch a user's profile summary
    Profile {
        /// Instagram username
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "igview=debug,info"
    } else {
        "igview=info,warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Search { query } => cmd_search(&query).await,
        Commands::Profile { username } => cmd_profile(&username).await,
    }
}

/// Run the API server
async fn cmd_serve(port: Option<u16>, bind: &str) -> Result<()> {
    let mut config = ApiConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    let port = config.port;

    println!("{}", "🚀 Starting igview API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("   {} {}", "Upstream:".dimmed(), config.imai.base_url);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config)?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;
    server.run(addr).await?;

    Ok(())
}

/// Search users
async fn cmd_search(query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Search query must not be empty");
    }

    let client = client()?;
    eprintln!("{} {}", "🔍 Searching for".cyan().bold(), query.yellow());

    let response = client.search_users(query).await?;
    let dto = normalize::search_users(&response);
    debug!(hits = dto.users.len(), "search completed");
    print_json(&dto)
}

/// Fetch a profile
async fn cmd_profile(username: &str) -> Result<()> {
    let username = username.trim().trim_start_matches('@');
    if username.is_empty() {
        bail!("Username must not be empty");
    }

    let client = client()?;
    eprintln!("{} {}", "👤 Fetching profile".cyan().bold(), username.yellow());

    let response = client.get_user_info(username).await?;
    match normalize::profile(&response, username) {
        Some(profile) => print_json(&profile),
        None => bail!("User '{}' not found", username),
    }
}

fn client() -> Result<ImaiClient> {
    let config = ImaiConfig::from_env().context("Failed to load IMAI configuration")?;
    Ok(ImaiClient::new(config)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
