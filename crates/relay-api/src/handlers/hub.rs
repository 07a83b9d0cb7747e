//! ChatServer handlers — RegisterClient, BroadcastMessage, ListClients.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use relay_core::wire::{
    validate_username, Ack, BroadcastRequest, BroadcastResponse, ClientInfo, ClientsResponse,
    RegisterRequest, RegisterResponse,
};
use relay_core::ChatMessage;
use relay_services::{ClientRecord, RpcError};

use super::HubState;

// ── RegisterClient ───────────────────────────────────────────────────────────

pub async fn handle_register_client(
    State(state): State<HubState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, (StatusCode, String)> {
    validate_username(&req.username).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let outbound = match state.connector.connect(&req.client_addr).await {
        Ok(outbound) => outbound,
        Err(e) => {
            tracing::warn!(
                username = %req.username,
                addr = %req.client_addr,
                error = %e,
                "failed to connect to client, not registering"
            );
            let status = match e {
                RpcError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            return Err((status, e.to_string()));
        }
    };

    let record = ClientRecord::new(req.username.clone(), req.client_addr.clone(), outbound);
    if let Some(previous) = state.registry.store(record) {
        if previous.addr != req.client_addr {
            tracing::warn!(
                username = %req.username,
                old_addr = %previous.addr,
                new_addr = %req.client_addr,
                "username re-registered from a new address"
            );
        }
    }

    tracing::info!(
        username = %req.username,
        addr = %req.client_addr,
        clients = state.registry.len(),
        "client registered"
    );
    Ok(Json(RegisterResponse { registered: true }))
}

// ── BroadcastMessage ─────────────────────────────────────────────────────────

/// Always acknowledges once fan-out has been attempted; per-recipient
/// failures are logged by the fan-out and never reach the sender.
pub async fn handle_broadcast_message(
    State(state): State<HubState>,
    Json(req): Json<BroadcastRequest>,
) -> Json<BroadcastResponse> {
    tracing::info!(username = %req.username, text = %req.text, "BroadcastMessage received");

    let message = ChatMessage::from(req);
    relay_services::broadcast(&state.registry, &message, state.push_timeout).await;

    Json(Ack::RECEIVED)
}

// ── ListClients ──────────────────────────────────────────────────────────────

pub async fn handle_list_clients(State(state): State<HubState>) -> Json<ClientsResponse> {
    let mut clients: Vec<ClientInfo> = state
        .registry
        .snapshot()
        .into_iter()
        .map(|r| ClientInfo {
            registered_secs: r.registered_at.elapsed().as_secs(),
            username: r.username,
            address: r.addr,
        })
        .collect();
    clients.sort_by(|a, b| a.username.cmp(&b.username));

    Json(ClientsResponse { clients })
}
