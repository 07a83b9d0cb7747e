//! Chat message model.
//!
//! A `ChatMessage` only lives for the duration of one broadcast: it is built
//! from a `BroadcastRequest` on the hub, pushed to each recipient as a
//! `SendRequest`, and rendered once on the receiving peer. Nothing stores it.

use crate::wire::{BroadcastRequest, SendRequest};

/// One line of chat text and the username that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    /// Username asserted by the sending peer. The hub does not verify it.
    pub sender: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
        }
    }

    /// Is this message from `username`? Used to skip the sender during fan-out.
    pub fn is_from(&self, username: &str) -> bool {
        self.sender == username
    }

    /// The push request delivered to every recipient.
    pub fn to_send_request(&self) -> SendRequest {
        SendRequest {
            text: self.text.clone(),
            username: self.sender.clone(),
        }
    }
}

impl From<BroadcastRequest> for ChatMessage {
    fn from(req: BroadcastRequest) -> Self {
        Self {
            text: req.text,
            sender: req.username,
        }
    }
}

impl From<SendRequest> for ChatMessage {
    fn from(req: SendRequest) -> Self {
        Self {
            text: req.text,
            sender: req.username,
        }
    }
}
