//! ChatClient handler — SendMessage, pushed by the hub.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use relay_core::wire::{Ack, SendRequest, SendResponse};
use relay_core::ChatMessage;

use super::PeerState;

pub async fn handle_send_message(
    State(state): State<PeerState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, (StatusCode, String)> {
    let message = ChatMessage::from(req);

    state
        .sink
        .deliver(&message, state.identity.username())
        .map_err(|e| {
            tracing::error!(
                sender = %message.sender,
                error = %e,
                "failed to render pushed message"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(Ack::RECEIVED))
}
