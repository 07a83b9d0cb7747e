//! RPC handlers — ChatServer on the hub, ChatClient on each peer.

pub mod hub;
pub mod peer;

use std::sync::Arc;
use std::time::Duration;

use relay_services::{ClientRegistry, Connector, MessageSink, PeerIdentity};

/// State behind the hub's ChatServer routes.
#[derive(Clone)]
pub struct HubState {
    pub registry: ClientRegistry,
    /// Opens push handles for registering peers.
    pub connector: Arc<dyn Connector>,
    /// Bound on each per-recipient push during fan-out.
    pub push_timeout: Duration,
}

/// State behind a peer's ChatClient route.
#[derive(Clone)]
pub struct PeerState {
    pub identity: PeerIdentity,
    pub sink: Arc<dyn MessageSink>,
}

pub use hub::{handle_broadcast_message, handle_list_clients, handle_register_client};
pub use peer::handle_send_message;
