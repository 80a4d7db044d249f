//! metaed-engine - metadata engine service
//!
//! Serves the extract/modify endpoints over exiftool.

use anyhow::{Context, Result};
use clap::Parser;
use metaed_common::config::{load_toml_config, resolve_log_level};
use metaed_engine::config::{EngineConfig, EngineOverrides};
use metaed_engine::exiftool::ExifTool;
use metaed_engine::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "metaed-engine")]
#[command(about = "Metadata engine service for MetaEdit")]
#[command(version)]
struct Args {
    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// exiftool executable
    #[arg(long)]
    exiftool: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_toml_config(args.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| resolve_log_level(&toml_config).into()),
        )
        .init();

    info!(
        "Starting MetaEdit engine (metaed-engine) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = EngineConfig::resolve(
        EngineOverrides {
            host: args.host,
            port: args.port,
            exiftool: args.exiftool,
        },
        &toml_config,
    );
    info!(
        "exiftool: {} (timeout {}s), upload limit {} MB",
        config.exiftool_path,
        config.exiftool_timeout.as_secs(),
        config.max_file_size_mb
    );

    let exiftool = ExifTool::new(&config.exiftool_path, config.exiftool_timeout);
    let address = config.bind_address();
    let app = build_router(AppState::new(Arc::new(exiftool), config));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!("metaed-engine listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
