//! Relay wire format — request and response bodies for both RPC services.
//!
//! These types ARE the protocol. Both services speak JSON over HTTP POST with
//! snake_case field names:
//!
//! - ChatServer (implemented by the hub, called by peers):
//!   `RegisterClient`, `BroadcastMessage`, plus the read-only `ListClients`.
//! - ChatClient (implemented by peers, called by the hub): `SendMessage`.
//!
//! Renaming a field here is a breaking change for every running peer.

use serde::{Deserialize, Serialize};

// ── Routes ───────────────────────────────────────────────────────────────────

/// ChatServer.RegisterClient
pub const REGISTER_CLIENT_PATH: &str = "/chat-server/register-client";

/// ChatServer.BroadcastMessage
pub const BROADCAST_MESSAGE_PATH: &str = "/chat-server/broadcast-message";

/// ChatServer.ListClients (diagnostic, GET)
pub const LIST_CLIENTS_PATH: &str = "/chat-server/clients";

/// ChatClient.SendMessage
pub const SEND_MESSAGE_PATH: &str = "/chat-client/send-message";

// ── ChatServer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    /// `host:port` of the registering peer's inbound endpoint.
    pub client_addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub text: String,
    /// Sender username, trusted as asserted.
    pub username: String,
}

/// Shared acknowledgement for `BroadcastMessage` and `SendMessage`.
///
/// `request_received` says the call was accepted for processing, never that
/// every recipient got the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub request_received: bool,
}

impl Ack {
    pub const RECEIVED: Ack = Ack {
        request_received: true,
    };
}

pub type BroadcastResponse = Ack;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsResponse {
    pub clients: Vec<ClientInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub username: String,
    pub address: String,
    pub registered_secs: u64,
}

// ── ChatClient ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub text: String,
    /// Username of the original sender, not of the hub.
    pub username: String,
}

pub type SendResponse = Ack;

// ── Username policy ──────────────────────────────────────────────────────────

/// Check a username before it is used as a registry key.
///
/// Blank names are rejected. Names already held by another peer are allowed;
/// the registry replaces the older record.
pub fn validate_username(username: &str) -> Result<(), WireError> {
    if username.trim().is_empty() {
        return Err(WireError::EmptyUsername);
    }
    if username.chars().any(char::is_control) {
        return Err(WireError::ControlCharacter);
    }
    Ok(())
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username must not contain control characters")]
    ControlCharacter,
}

// ── Tests ────────────────────────────────────────────────────────────────────
