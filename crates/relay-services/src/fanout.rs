//! Broadcast fan-out — pushes one message to every registered peer but the sender.
//!
//! Delivery is best-effort. Every recipient gets its own push, all pushes run
//! concurrently, each is bounded by `push_timeout`, and a failure is logged
//! and counted but never stops the others or reaches the sender.

use std::time::Duration;

use futures::future::join_all;
use relay_core::ChatMessage;

use crate::registry::{ClientRecord, ClientRegistry};

/// What happened to one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    /// Pushes issued (registered peers minus the sender).
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Fan `message` out to every registered peer except its sender.
pub async fn broadcast(
    registry: &ClientRegistry,
    message: &ChatMessage,
    push_timeout: Duration,
) -> FanoutReport {
    let mut recipients: Vec<ClientRecord> = Vec::new();
    registry.visit(|username, record| {
        if !message.is_from(username) {
            recipients.push(record.clone());
        }
        true
    });

    let outcomes = join_all(
        recipients
            .iter()
            .map(|recipient| push(recipient, message, push_timeout)),
    )
    .await;

    let delivered = outcomes.iter().filter(|ok| **ok).count();
    let report = FanoutReport {
        attempted: outcomes.len(),
        delivered,
        failed: outcomes.len() - delivered,
    };

    tracing::info!(
        sender = %message.sender,
        attempted = report.attempted,
        delivered = report.delivered,
        failed = report.failed,
        "broadcast fan-out complete"
    );
    report
}

async fn push(recipient: &ClientRecord, message: &ChatMessage, push_timeout: Duration) -> bool {
    let result = tokio::time::timeout(push_timeout, recipient.outbound.send_message(message)).await;

    match result {
        Ok(Ok(ack)) if ack.request_received => {
            tracing::debug!(username = %recipient.username, "message forwarded");
            true
        }
        Ok(Ok(_)) => {
            tracing::warn!(
                username = %recipient.username,
                addr = %recipient.addr,
                "recipient did not acknowledge message"
            );
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(
                username = %recipient.username,
                addr = %recipient.addr,
                text = %message.text,
                error = %e,
                "failed to forward message"
            );
            false
        }
        Err(_) => {
            tracing::warn!(
                username = %recipient.username,
                addr = %recipient.addr,
                timeout_ms = push_timeout.as_millis() as u64,
                "push timed out"
            );
            false
        }
    }
}
