//! Service traits for the two RPC contracts.
//!
//! The hub only ever talks to peers through [`PushClient`] handles produced
//! by a [`Connector`]; a peer only talks to the hub through
//! [`ChatServerApi`]. The HTTP implementations live in [`crate::rpc`]; tests
//! substitute in-memory ones.

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::wire::{Ack, RegisterResponse};
use relay_core::ChatMessage;

use crate::rpc::RpcError;

/// Outbound handle to one peer's ChatClient endpoint.
#[async_trait]
pub trait PushClient: Send + Sync {
    /// ChatClient.SendMessage: deliver `message` to this peer.
    async fn send_message(&self, message: &ChatMessage) -> Result<Ack, RpcError>;
}

/// Opens push handles for peers as they register.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Resolve `addr` and make sure something is listening there.
    ///
    /// A peer whose endpoint cannot be reached must not be registered, so
    /// implementations fail here rather than on the first push.
    async fn connect(&self, addr: &str) -> Result<Arc<dyn PushClient>, RpcError>;
}

/// Outbound handle to the hub's ChatServer endpoint.
#[async_trait]
pub trait ChatServerApi: Send + Sync {
    /// ChatServer.RegisterClient
    async fn register_client(
        &self,
        username: &str,
        client_addr: &str,
    ) -> Result<RegisterResponse, RpcError>;

    /// ChatServer.BroadcastMessage
    async fn broadcast_message(&self, text: &str, username: &str) -> Result<Ack, RpcError>;
}
