//! relayd — chat relay hub.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use relay_api::HubState;
use relay_core::RelayConfig;
use relay_services::{ClientRegistry, HttpConnector, Shutdown, ShutdownReason};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat relay hub", long_about = None)]
struct Cli {
    /// Port for the ChatServer endpoint.
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let shutdown = Shutdown::new();
    shutdown.watch_signals();

    if let Err(e) = start(cli, &shutdown).await {
        let error = format!("{:#}", e);
        tracing::error!(%error, "hub failed to start");
        shutdown.trigger(ShutdownReason::Fatal(error));
    }

    let reason = shutdown.triggered().await;
    tracing::info!(%reason, "hub shutting down");
    std::process::exit(0);
}

async fn start(cli: Cli, shutdown: &Shutdown) -> Result<()> {
    let mut config = RelayConfig::load().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.hub.port = port;
    }

    let listener = relay_api::bind(&config.hub.bind_addr()).await?;

    let registry = ClientRegistry::new();
    let state = HubState {
        registry,
        connector: Arc::new(HttpConnector::new()),
        push_timeout: config.hub.push_timeout(),
    };
    tracing::info!(
        port = config.hub.port,
        push_timeout_secs = config.hub.push_timeout_secs,
        "hub starting"
    );

    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = relay_api::serve(listener, relay_api::hub_router(state)).await {
            let error = format!("{:#}", e);
            tracing::error!(%error, "ChatServer endpoint failed");
            shutdown.trigger(ShutdownReason::Fatal(error));
        }
    });

    Ok(())
}
