//! Health Dashboard
//!
//! An MCP server for daily body metrics, nutrition goals and weight trajectories.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use healthdash::build_info;
use healthdash::config::{AppConfig, StorageBackend};
use healthdash::mcp::HealthDashService;
use healthdash::storage::Stores;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("healthdash=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env()?;
    match config.storage {
        StorageBackend::Sqlite => eprintln!("Database path: {}", config.database_path.display()),
        StorageBackend::Memory => eprintln!("Storage: in-memory (data is lost on exit)"),
    }
    eprintln!(
        "Dashboard day boundary: UTC{:+}, trajectory window: {} days",
        config.utc_offset_hours, config.trajectory_window_days
    );

    // Open storage and run migrations
    let stores = Stores::from_config(&config)?;

    let service = HealthDashService::new(config, stores);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
