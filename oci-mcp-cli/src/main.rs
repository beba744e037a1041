//! oci-mcp - stdio MCP server for Oracle Cloud Infrastructure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oci_mcp_core::client::IdentityApi;
use oci_mcp_core::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oci-mcp")]
#[command(about = "MCP server exposing Oracle Cloud Infrastructure tools over stdio", long_about = None)]
#[command(version)]
struct Cli {
    /// Server configuration file (defaults to ./oci-mcp.toml)
    #[arg(short, long, env = "OCI_MCP_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP on stdin/stdout (default)
    Serve,
    /// Resolve credentials and fetch the tenancy to verify connectivity
    Check,
    /// Version information
    Version,
}

fn init_tracing(config: &ServerConfig) {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.tracing_directive())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn client_factory(config: &ServerConfig) -> Result<ClientFactory> {
    let credentials = resolve_credentials().context("Failed to resolve OCI credentials")?;
    info!(
        mode = %credentials.mode,
        region = %credentials.region(),
        "Resolved OCI credentials"
    );

    Ok(ClientFactory::from_credentials(credentials)
        .context("Failed to build OCI clients")?
        .with_endpoint_override(config.endpoint_override.clone())
        .with_default_compartment(config.default_compartment().map(str::to_string)))
}

async fn serve(config: &ServerConfig) -> Result<()> {
    let factory = client_factory(config)?;
    let server = McpServer::from_config(config, Arc::new(factory))
        .context("Failed to register tools")?;

    info!(
        name = %config.name,
        allow_mutations = config.allow_mutations,
        "Starting MCP server on stdio"
    );
    server
        .run(StdioTransport::new())
        .await
        .context("MCP transport failed")?;
    Ok(())
}

async fn check(config: &ServerConfig) -> Result<()> {
    let factory = client_factory(config)?;
    let tenancy_id = factory.tenancy_id();
    let tenancy = factory
        .identity_client()
        .get_tenancy(&tenancy_id)
        .await
        .with_context(|| format!("Failed to fetch tenancy {}", tenancy_id))?;

    println!("Tenancy: {}", tenancy.name);
    println!(
        "Home region: {}",
        tenancy.home_region_key.as_deref().unwrap_or("unknown")
    );
    println!("Region: {}", factory.region());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path),
        None => ServerConfig::load(),
    }
    .context("Failed to load server configuration")?;

    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await?,
        Commands::Check => check(&config).await?,
        Commands::Version => {
            println!("oci-mcp {}", env!("CARGO_PKG_VERSION"));
            println!("oci-mcp-core {}", oci_mcp_core::VERSION);
        }
    }

    Ok(())
}
