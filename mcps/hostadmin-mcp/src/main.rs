//! Host Admin MCP - host inventory and control over MCP stdio
//!
//! Usage:
//!   hostadmin-mcp                      serve MCP over stdio
//!   hostadmin-mcp --config admin.toml  serve with an explicit config file
//!   hostadmin-mcp dashboard            print one dashboard snapshot as JSON

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;

use host_inventory::{HostInventory, InventoryConfig, ResourceSampler};
use hostadmin_mcp::{init::init_tracing, HostAdminMcpServer};

#[derive(Parser)]
#[command(name = "hostadmin-mcp")]
#[command(about = "Host administration MCP server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (HOSTADMIN_CONFIG_PATH takes precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP tools over stdio (default)
    Serve,
    /// Print one dashboard refresh as JSON and exit
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = InventoryConfig::load(cli.config.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Dashboard => dashboard(config).await,
    }
}

async fn serve(config: InventoryConfig) -> Result<()> {
    tracing::info!("Starting hostadmin MCP Server");

    let server = HostAdminMcpServer::with_config(config);
    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}

async fn dashboard(config: InventoryConfig) -> Result<()> {
    let inventory = HostInventory::native(config);
    let mut sampler = ResourceSampler::new();
    let dashboard = inventory.dashboard(&mut sampler).await;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
