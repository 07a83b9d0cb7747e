//! HTTP stubs for both RPC services.
//!
//! Each call is a JSON POST to a fixed route on `http://<host:port>`. No TLS:
//! the relay assumes a trusted local network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;

use relay_core::wire::{
    Ack, BroadcastRequest, RegisterRequest, RegisterResponse, BROADCAST_MESSAGE_PATH,
    REGISTER_CLIENT_PATH, SEND_MESSAGE_PATH,
};
use relay_core::ChatMessage;

use crate::service::{ChatServerApi, Connector, PushClient};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("invalid address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Turn a `host:port` address into the base URL of its RPC endpoint.
pub fn base_url(addr: &str) -> Result<Url, RpcError> {
    let invalid = |reason: &str| RpcError::InvalidAddress {
        addr: addr.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(&format!("http://{}", addr)).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("expected host:port"));
    }
    // `Url::port` hides the scheme default, so `host:80` has to be checked raw.
    let has_port = addr
        .rsplit_once(':')
        .is_some_and(|(_, port)| port.parse::<u16>().is_ok());
    if !has_port {
        return Err(invalid("missing port"));
    }
    Ok(url)
}

fn route(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(path);
    url
}

async fn post_json_body<T, R>(http: &reqwest::Client, url: Url, body: &T) -> Result<R, RpcError>
where
    T: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let transport = |source| RpcError::Transport {
        url: url.to_string(),
        source,
    };

    let resp = http
        .post(url.clone())
        .json(body)
        .send()
        .await
        .map_err(transport)?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RpcError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    resp.json::<R>().await.map_err(transport)
}

// ── ChatClient stub (hub → peer) ──────────────────────────────────────────────

/// Push handle bound to one peer's inbound endpoint.
pub struct HttpPushClient {
    send_url: Url,
    http: reqwest::Client,
}

impl HttpPushClient {
    pub fn new(addr: &str, http: reqwest::Client) -> Result<Self, RpcError> {
        let base = base_url(addr)?;
        Ok(Self {
            send_url: route(&base, SEND_MESSAGE_PATH),
            http,
        })
    }
}

#[async_trait]
impl PushClient for HttpPushClient {
    async fn send_message(&self, message: &ChatMessage) -> Result<Ack, RpcError> {
        post_json_body(&self.http, self.send_url.clone(), &message.to_send_request()).await
    }
}

/// Opens [`HttpPushClient`]s, probing each address with a TCP connect first.
#[derive(Clone, Default)]
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, addr: &str) -> Result<Arc<dyn PushClient>, RpcError> {
        let client = HttpPushClient::new(addr, self.http.clone())?;

        // The probe connection is dropped straight away; reqwest keeps its own pool.
        TcpStream::connect(addr)
            .await
            .map_err(|source| RpcError::Connect {
                addr: addr.to_string(),
                source,
            })?;

        tracing::debug!(addr, "push endpoint reachable");
        Ok(Arc::new(client))
    }
}

// ── ChatServer stub (peer → hub) ──────────────────────────────────────────────

/// Client for the hub's ChatServer endpoint.
pub struct HubClient {
    register_url: Url,
    broadcast_url: Url,
    http: reqwest::Client,
}

impl HubClient {
    pub fn new(server_addr: &str) -> Result<Self, RpcError> {
        let base = base_url(server_addr)?;
        Ok(Self {
            register_url: route(&base, REGISTER_CLIENT_PATH),
            broadcast_url: route(&base, BROADCAST_MESSAGE_PATH),
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl ChatServerApi for HubClient {
    async fn register_client(
        &self,
        username: &str,
        client_addr: &str,
    ) -> Result<RegisterResponse, RpcError> {
        let req = RegisterRequest {
            username: username.to_string(),
            client_addr: client_addr.to_string(),
        };
        post_json_body(&self.http, self.register_url.clone(), &req).await
    }

    async fn broadcast_message(&self, text: &str, username: &str) -> Result<Ack, RpcError> {
        let req = BroadcastRequest {
            text: text.to_string(),
            username: username.to_string(),
        };
        post_json_body(&self.http, self.broadcast_url.clone(), &req).await
    }
}
