//! Folio Server - HTTP backend for the portfolio frontend.
//!
//! This binary serves GitHub project listings and README previews built by
//! the folio-core library as cacheable JSON.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use folio_core::{GitHubSettings, ProjectService};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "folio-server")]
#[command(about = "HTTP server for portfolio project data")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// GitHub account to list (overrides GITHUB_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// GitHub API base URL (GitHub Enterprise or a local mock)
    #[arg(long)]
    api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG wins over --debug when set
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Folio Server");

    let mut settings = GitHubSettings::from_env();
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(api_base) = args.api_base {
        settings = settings.with_api_base(api_base);
    }
    info!("Serving repositories of {}", settings.username);

    let projects = ProjectService::from_settings(settings)?;
    let addr = server::start_server(projects, &args.host, args.port).await?;

    info!("Server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
