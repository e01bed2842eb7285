//! vmview daemon
//!
//! Serves an aggregated virtual-machine inventory over HTTP, backed by the
//! management REST API and the SOAP object graph.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vmview_inventory::InventoryAggregator;
use vmview_upstream::{Credentials, RestClient, SoapClient};

mod api;
mod config;
mod router;
mod state;

use config::{Config, DaemonConfig, LogFormat};
use state::AppState;

/// vmview inventory daemon
#[derive(Parser, Debug)]
#[command(name = "vmview", version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,
}

fn init_tracing(daemon: &DaemonConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&daemon.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match daemon.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_inventory(config: &Config) -> Result<InventoryAggregator> {
    let vcenter = &config.vcenter;
    let credentials = Credentials::new(&vcenter.user, &vcenter.password);

    let http = reqwest::Client::builder()
        .danger_accept_invalid_certs(vcenter.accept_invalid_certs)
        .build()?;
    let rest = RestClient::with_client(&vcenter.host, credentials.clone(), http)?
        .with_timeouts(vcenter.timeouts());

    let soap = SoapClient::new(&vcenter.host, vcenter.soap_port, credentials)?
        .with_timeout(vcenter.timeouts().long)
        .with_accept_invalid_certs(vcenter.accept_invalid_certs);

    Ok(InventoryAggregator::new(
        Arc::new(rest),
        Arc::new(soap),
        &config.cache,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.apply_env_overrides();
    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    init_tracing(&config.daemon);
    config.validate()?;

    let inventory = build_inventory(&config)?;
    inventory.clear_all_caches().await;
    info!("inventory caches cleared");

    let state = Arc::new(AppState::new(inventory));
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.daemon.bind).await?;
    info!(bind = %config.daemon.bind, upstream = %config.vcenter.host, "vmview daemon listening");
    axum::serve(listener, app).await?;

    Ok(())
}
