//! relay-core — shared wire types, message model and configuration.
//! Every other relay crate depends on this one.

pub mod config;
pub mod message;
pub mod wire;

pub use config::RelayConfig;
pub use message::ChatMessage;
