//! RAX File Store - Entry Point
//!
//! A hierarchical file store served over HTTP, with per-directory metadata
//! indexes layered over plain directories.

use log::{error, info};
use std::process::ExitCode;

use rax_file_store::Server;
use rax_file_store::config::ServerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG, defaulting to info)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching file store...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped with error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server shut down");
    ExitCode::SUCCESS
}
