//! Peer side of the relay: identity and the outbound chat loop.
//!
//! A peer runs two independent halves. The inbound ChatClient endpoint (see
//! `relay-api`) renders pushed messages; the [`ChatLoop`] here reads local
//! input, registers once, then broadcasts each line. The halves share only
//! the [`PeerIdentity`] and the process [`Shutdown`].

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use relay_core::wire::validate_username;

use crate::lifecycle::{Shutdown, ShutdownReason};
use crate::service::ChatServerApi;
use crate::sink::MessageSink;

/// The peer's username, written once after it is read from input.
#[derive(Debug, Clone, Default)]
pub struct PeerIdentity {
    username: Arc<OnceLock<String>>,
}

impl PeerIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a username was already set.
    pub fn set(&self, username: impl Into<String>) -> bool {
        self.username.set(username.into()).is_ok()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }
}

/// Outbound half of a peer: input → RegisterClient once → BroadcastMessage per line.
pub struct ChatLoop<R> {
    input: Lines<R>,
    hub: Arc<dyn ChatServerApi>,
    console: Arc<dyn MessageSink>,
    identity: PeerIdentity,
    /// Address the hub should push to.
    client_addr: String,
    broadcast_timeout: Duration,
    shutdown: Shutdown,
}

impl<R> ChatLoop<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(
        input: R,
        hub: Arc<dyn ChatServerApi>,
        console: Arc<dyn MessageSink>,
        identity: PeerIdentity,
        client_addr: String,
        broadcast_timeout: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            input: input.lines(),
            hub,
            console,
            identity,
            client_addr,
            broadcast_timeout,
            shutdown,
        }
    }

    /// Run until input ends, registration fails, or shutdown is triggered.
    /// Every exit path other than an outside trigger cancels `shutdown`.
    pub async fn run(mut self) {
        let Some(username) = self.read_username().await else {
            return;
        };
        self.identity.set(username.clone());

        match self.hub.register_client(&username, &self.client_addr).await {
            Ok(resp) if resp.registered => {
                tracing::info!(
                    username = %username,
                    addr = %self.client_addr,
                    "registered with hub"
                );
            }
            Ok(_) => {
                self.fatal("hub refused registration".to_string());
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to register with hub");
                self.fatal(format!("registration failed: {}", e));
                return;
            }
        }

        if !self.show("Send a message to start chatting!\n") {
            return;
        }

        while !self.shutdown.is_triggered() {
            if !self.show(&format!("{}: ", username)) {
                return;
            }
            let Some(line) = self.next_line().await else {
                return;
            };

            // `Lines` has already stripped the line ending.
            if line.trim().is_empty() {
                continue;
            }
            self.broadcast(&line, &username).await;
        }
    }

    async fn read_username(&mut self) -> Option<String> {
        loop {
            if !self.show("Enter a username: ") {
                return None;
            }
            let line = self.next_line().await?;
            let username = line.trim();
            match validate_username(username) {
                Ok(()) => return Some(username.to_string()),
                Err(e) => tracing::warn!(error = %e, "invalid username, asking again"),
            }
        }
    }

    /// Next input line, or `None` once input is done or shutdown fired.
    async fn next_line(&mut self) -> Option<String> {
        let line = tokio::select! {
            reason = self.shutdown.triggered() => {
                tracing::debug!(%reason, "chat loop cancelled");
                return None;
            }
            line = self.input.next_line() => line,
        };

        match line {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                tracing::info!("input closed");
                self.shutdown.trigger(ShutdownReason::InputClosed);
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                self.shutdown.trigger(ShutdownReason::InputFailed(e.to_string()));
                None
            }
        }
    }

    async fn broadcast(&self, text: &str, username: &str) {
        let call = self.hub.broadcast_message(text, username);
        match tokio::time::timeout(self.broadcast_timeout, call).await {
            Ok(Ok(ack)) if ack.request_received => tracing::debug!("broadcast accepted"),
            Ok(Ok(_)) => tracing::warn!(text, "hub did not accept broadcast"),
            Ok(Err(e)) => tracing::warn!(error = %e, "BroadcastMessage failed"),
            Err(_) => tracing::warn!(
                timeout_secs = self.broadcast_timeout.as_secs_f64(),
                "BroadcastMessage timed out"
            ),
        }
    }

    fn show(&self, text: &str) -> bool {
        match self.console.prompt(text) {
            Ok(()) => true,
            Err(e) => {
                self.fatal(e.to_string());
                false
            }
        }
    }

    fn fatal(&self, reason: String) {
        self.shutdown.trigger(ShutdownReason::Fatal(reason));
    }
}
