//! Syncthing Healthcheck
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - SYNCTHING_API_KEY: Syncthing REST API key (required)
//! - CONFIG_PATH: Path to the YAML config (default: /config/config.yaml)
//! - RUST_LOG: Log level (default: info)
//!
//! Exits with status 1 if the API key is missing or the config cannot be
//! loaded, and with status 0 on Ctrl-C or SIGTERM.

use std::process::ExitCode;

use syncthing_healthcheck::app;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syncthing_healthcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let checker = match app::startup(|key| std::env::var(key).ok()) {
        Ok(checker) => checker,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = checker.config();
    tracing::info!("Syncthing healthcheck configuration:");
    tracing::info!("  Syncthing: {}", config.syncthing.url);
    tracing::info!("  Check interval: {} seconds", config.check_interval_secs);
    tracing::info!("  Devices: {}", config.devices.len());

    tokio::select! {
        _ = checker.run() => {}
        _ = shutdown_signal() => {
            tracing::info!("Shutting down...");
        }
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
