//! Relay integration test harness.
//!
//! Hubs and peers run in-process on ephemeral loopback ports, talking real
//! HTTP to each other. Nothing needs to be running beforehand:
//!
//!   cargo test --test integration
//!
//! Every test builds its own hub, so tests never share a registry.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use relay_api::{HubState, PeerState};
use relay_core::ChatMessage;
use relay_services::{
    ChatLoop, ChatServerApi, ClientRegistry, HttpConnector, HubClient, MessageSink,
    PeerIdentity, Shutdown, SinkError,
};

mod chat_loop;
mod failures;
mod messaging;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

pub const PUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// A hub serving on `addr`, with direct access to its registry.
pub struct Hub {
    pub addr: String,
    pub registry: ClientRegistry,
}

impl Hub {
    pub fn client(&self) -> Result<HubClient> {
        HubClient::new(&self.addr).context("hub address")
    }
}

pub async fn spawn_hub(push_timeout: Duration) -> Result<Hub> {
    let listener = relay_api::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let registry = ClientRegistry::new();
    let app = relay_api::hub_router(HubState {
        registry: registry.clone(),
        connector: Arc::new(HttpConnector::new()),
        push_timeout,
    });
    tokio::spawn(relay_api::serve(listener, app));
    Ok(Hub { addr, registry })
}

/// Collects whatever the peer's ChatClient endpoint renders.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<ChatMessage>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<ChatMessage> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl MessageSink for RecordingSink {
    fn deliver(&self, message: &ChatMessage, _: Option<&str>) -> Result<(), SinkError> {
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn prompt(&self, text: &str) -> Result<(), SinkError> {
        self.prompts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A peer's inbound side: the ChatClient endpoint and what it rendered.
pub struct Peer {
    pub addr: String,
    pub identity: PeerIdentity,
    pub sink: Arc<RecordingSink>,
    server: JoinHandle<Result<()>>,
}

impl Peer {
    /// Stop serving and release the port. Later connections are refused.
    pub async fn kill(self) {
        self.server.abort();
        let _ = self.server.await;
    }
}

pub async fn spawn_peer() -> Result<Peer> {
    let listener = relay_api::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let identity = PeerIdentity::new();
    let sink = Arc::new(RecordingSink::default());
    let app = relay_api::peer_router(PeerState {
        identity: identity.clone(),
        sink: sink.clone(),
    });
    let server = tokio::spawn(relay_api::serve(listener, app));
    Ok(Peer {
        addr,
        identity,
        sink,
        server,
    })
}

/// Register `username` at `peer` directly, bypassing the chat loop.
pub async fn register(hub: &Hub, username: &str, peer: &Peer) -> Result<()> {
    let resp = hub.client()?.register_client(username, &peer.addr).await?;
    if !resp.registered {
        bail!("hub did not register {}", username);
    }
    peer.identity.set(username);
    Ok(())
}

/// A peer's outbound side: a chat loop fed through an in-memory pipe.
pub struct Chat {
    input: DuplexStream,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl Chat {
    pub fn start(hub: &Hub, peer: &Peer) -> Result<Chat> {
        let (input, reader) = tokio::io::duplex(4096);
        let shutdown = Shutdown::new();
        let chat = ChatLoop::new(
            BufReader::new(reader),
            Arc::new(hub.client()?),
            peer.sink.clone(),
            peer.identity.clone(),
            peer.addr.clone(),
            PUSH_TIMEOUT,
            shutdown.clone(),
        );
        Ok(Chat {
            input,
            shutdown,
            task: tokio::spawn(chat.run()),
        })
    }

    pub async fn type_line(&mut self, line: &str) -> Result<()> {
        self.input.write_all(line.as_bytes()).await?;
        self.input.write_all(b"\n").await?;
        Ok(())
    }

    /// Close the input stream, as if stdin hit end of file.
    pub async fn close(mut self) -> Result<JoinHandle<()>> {
        self.input.shutdown().await?;
        drop(self.input);
        Ok(self.task)
    }
}

/// Poll `check` until it holds or `WAIT` runs out.
pub async fn wait_until<F>(what: &str, mut check: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            bail!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}

/// An address nothing is listening on.
pub async fn closed_addr() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    drop(listener);
    Ok(addr)
}
