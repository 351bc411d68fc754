//! aava-vs (Validation Service) - Main entry point
//!
//! HTTP front end for grid code decoding and address validation.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;

use aava_common::config::{resolve_config_path, LoggingConfig, TomlConfig};
use aava_common::{ConfidenceScale, Validator};
use aava_vs::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for aava-vs
#[derive(Parser, Debug)]
#[command(name = "aava-vs")]
#[command(about = "Address validation service for AAVA")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "AAVA_VS_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long, env = "AAVA_VS_HOST")]
    host: Option<String>,

    /// Confidence scale: weighted or normalized (overrides config)
    #[arg(long, env = "AAVA_VS_SCALE")]
    scale: Option<ConfidenceScale>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Nothing is logged until tracing is initialized from the loaded config
    let config_path = resolve_config_path(args.config.as_deref());
    let (mut config, source) =
        TomlConfig::load_resolved(config_path).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.service.port = port;
    }
    if let Some(host) = args.host {
        config.service.host = host;
    }
    if let Some(scale) = args.scale {
        config.scoring.scale = scale;
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging)?;

    info!(
        "Starting AAVA Validation Service (aava-vs) v{}",
        env!("CARGO_PKG_VERSION")
    );
    source.log();

    let reference = config
        .load_reference_table()
        .context("Failed to load reference table")?;
    info!(
        "Reference table: {} regions ({})",
        reference.regions.len(),
        config
            .reference
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in sample".to_string())
    );
    info!("Confidence scale: {}", config.scoring.scale.as_str());

    let validator = Validator::builder()
        .scale(config.scoring.scale)
        .lookup(reference)
        .build();

    let app = build_router(AppState::new(validator));

    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("aava-vs listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing; RUST_LOG wins over the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = logging.level.to_lowercase();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("aava_vs={level},aava_common={level},tower_http={level}").into()
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
