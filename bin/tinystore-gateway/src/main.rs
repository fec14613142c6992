//! tinystore gateway
//!
//! Serves the blob API over HTTP from a single redb database file.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tinystore_common::Config;
use tinystore_gateway::{AppState, auth_middleware::GateState, build_router};
use tinystore_store::BlobStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tinystore-gateway")]
#[command(about = "tinystore HTTP blob gateway")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/tinystore/gateway.toml")]
    config: String,

    /// Listen address for the HTTP API
    #[arg(short, long)]
    listen: Option<String>,

    /// Path of the redb database file
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Accepted shared secret (repeatable)
    #[arg(long = "secret", env = "TINYSTORE_SECRET")]
    secrets: Vec<String>,

    /// Disable the shared-secret check (for development)
    #[arg(long, default_value_t = false)]
    no_auth: bool,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load config file if it exists
    let config: Config = if std::path::Path::new(&args.config).exists() {
        let config_str = std::fs::read_to_string(&args.config)?;
        Config::from_toml(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", args.config, e))?
    } else {
        Config::default()
    };

    // CLI takes precedence over the config file
    let listen = args.listen.unwrap_or(config.server.listen);
    let db_path = args.db_path.unwrap_or(config.storage.path);
    let log_level = args.log_level.unwrap_or(config.logging.level);
    let secrets = if args.secrets.is_empty() {
        config.auth.secrets
    } else {
        args.secrets
    };
    let auth_enabled = config.auth.enabled && !args.no_auth;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tinystore gateway");
    info!("Config file: {}", args.config);
    info!("Database: {}", db_path.display());

    let store = BlobStore::open(&db_path)
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", db_path.display(), e))?;

    let gate = if auth_enabled {
        if secrets.is_empty() {
            warn!("No secrets configured; every gated request will be rejected");
        }
        info!("Shared-secret gate is ENABLED ({} secrets)", secrets.len());
        GateState::new(secrets)
    } else {
        info!("Shared-secret gate is DISABLED (development mode)");
        GateState::disabled()
    };

    let max_body_bytes = config.server.max_body_bytes;
    info!("Max upload size: {} bytes", max_body_bytes);

    let state = Arc::new(AppState {
        store: Arc::new(store),
    });
    let app = build_router(state, Arc::new(gate), max_body_bytes);

    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", listen, e))?;

    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await?;

    info!("Gateway shut down gracefully");

    Ok(())
}
