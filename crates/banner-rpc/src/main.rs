//! Banner RPC Server - JSON-RPC backend for the editor plugin.
//!
//! This binary provides a JSON-RPC 2.0 server that wraps the banner-core
//! engine for the plugin shim running inside the editor.

mod handlers;
mod server;
mod wrapper;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "banner-rpc")]
#[command(about = "JSON-RPC server for note banners")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Vault root directory (defaults to the current directory)
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Settings file (defaults to <vault>/.banner/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Banner RPC Server");

    let vault_root = match args.vault {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    info!("Vault root: {}", vault_root.display());

    let state = server::AppState::open(vault_root, args.settings)?;
    let addr = server::start_server(state, &args.host, args.port).await?;

    // Print port for the plugin shim to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
