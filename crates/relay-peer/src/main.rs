//! relay-peer — chat participant. Serves the ChatClient endpoint for pushes
//! from the hub and drives the console chat loop against it.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use relay_api::PeerState;
use relay_core::RelayConfig;
use relay_services::{
    ChatLoop, ConsoleSink, HubClient, MessageSink, PeerIdentity, Shutdown, ShutdownReason,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat relay peer", long_about = None)]
struct Cli {
    /// Port for this peer's ChatClient endpoint.
    #[arg(long)]
    port: Option<u16>,

    /// Address of the hub, as `host:port`.
    #[arg(long)]
    server_addr: Option<String>,
}

// stdout is the chat console, so logs go to stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let shutdown = Shutdown::new();
    shutdown.watch_signals();

    if let Err(e) = start(cli, &shutdown).await {
        let error = format!("{:#}", e);
        tracing::error!(%error, "peer failed to start");
        shutdown.trigger(ShutdownReason::Fatal(error));
    }

    let reason = shutdown.triggered().await;
    tracing::info!(%reason, "peer shutting down");
    // The stdin reader may still be parked in a blocking read; exiting here
    // avoids waiting on it during runtime teardown.
    std::process::exit(0);
}

async fn start(cli: Cli, shutdown: &Shutdown) -> Result<()> {
    let mut config = RelayConfig::load().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.peer.port = port;
    }
    if let Some(server_addr) = cli.server_addr {
        config.peer.server_addr = server_addr;
    }

    let listener = relay_api::bind(&config.peer.bind_addr()).await?;
    let hub = HubClient::new(&config.peer.server_addr)
        .with_context(|| format!("invalid hub address {}", config.peer.server_addr))?;

    let identity = PeerIdentity::new();
    let console: Arc<dyn MessageSink> = Arc::new(ConsoleSink::stdout());
    tracing::info!(
        port = config.peer.port,
        server_addr = %config.peer.server_addr,
        "peer starting"
    );

    // ── Inbound: ChatClient endpoint ─────────────────────────────────────────
    let app = relay_api::peer_router(PeerState {
        identity: identity.clone(),
        sink: console.clone(),
    });
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = relay_api::serve(listener, app).await {
                let error = format!("{:#}", e);
                tracing::error!(%error, "ChatClient endpoint failed");
                shutdown.trigger(ShutdownReason::Fatal(error));
            }
        });
    }

    // ── Outbound: chat loop ──────────────────────────────────────────────────
    let chat = ChatLoop::new(
        BufReader::new(tokio::io::stdin()),
        Arc::new(hub),
        console,
        identity,
        config.peer.advertised_addr(),
        config.peer.broadcast_timeout(),
        shutdown.clone(),
    );
    tokio::spawn(chat.run());

    Ok(())
}
