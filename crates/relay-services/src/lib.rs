//! relay-services — hub registry and fan-out, peer chat loop, RPC stubs and
//! the process lifecycle shared by both binaries.

pub mod fanout;
pub mod lifecycle;
pub mod peer;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod sink;


pub use fanout::{broadcast, FanoutReport};
pub use lifecycle::{Shutdown, ShutdownReason};
pub use peer::{ChatLoop, PeerIdentity};
pub use registry::{ClientRecord, ClientRegistry};
pub use rpc::{HttpConnector, HttpPushClient, HubClient, RpcError};
pub use service::{ChatServerApi, Connector, PushClient};
pub use sink::{ConsoleSink, MessageSink, SinkError};
