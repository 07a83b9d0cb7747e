pub mod handlers;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use relay_core::wire::{
    BROADCAST_MESSAGE_PATH, LIST_CLIENTS_PATH, REGISTER_CLIENT_PATH, SEND_MESSAGE_PATH,
};

pub use handlers::{HubState, PeerState};

/// ChatServer service, served by the hub.
pub fn hub_router(state: HubState) -> Router {
    Router::new()
        .route(REGISTER_CLIENT_PATH, post(handlers::handle_register_client))
        .route(BROADCAST_MESSAGE_PATH, post(handlers::handle_broadcast_message))
        .route(LIST_CLIENTS_PATH, get(handlers::handle_list_clients))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// ChatClient service, served by every peer.
pub fn peer_router(state: PeerState) -> Router {
    Router::new()
        .route(SEND_MESSAGE_PATH, post(handlers::handle_send_message))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind an RPC listener. Failing here is fatal for either binary.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))
}

/// Serve `app` on `listener` until the process exits.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "RPC endpoint listening");
    axum::serve(listener, app).await.context("RPC server failed")?;
    Ok(())
}
