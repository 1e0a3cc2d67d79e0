//! TideGuard - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Settings::default()
    });

    init_logging(&settings.logging);

    info!("=== TideGuard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting coastal hazard service...");

    run_server(settings).await?;

    Ok(())
}
