//! Configuration system for the relay.
//!
//! Resolution order: defaults → `RELAY_*` environment variables → command-line
//! flags. The binaries apply their flags on top of what [`RelayConfig::load`]
//! returns. There is no config file.

use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub hub: HubConfig,
    pub peer: PeerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Interface the ChatServer endpoint binds to.
    pub host: String,
    pub port: u16,
    /// Upper bound on each per-recipient push during fan-out.
    pub push_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    /// Interface the ChatClient endpoint binds to.
    pub host: String,
    pub port: u16,
    /// Hub address, `host:port`.
    pub server_addr: String,
    /// Host name sent to the hub at registration; the hub dials it back.
    pub advertise_host: String,
    /// Upper bound on each outbound `BroadcastMessage` call.
    pub broadcast_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_HUB_PORT: u16 = 8080;
pub const DEFAULT_PEER_PORT: u16 = 8081;
pub const DEFAULT_SERVER_ADDR: &str = "localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_HUB_PORT,
            push_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PEER_PORT,
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            advertise_host: "localhost".to_string(),
            broadcast_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl HubConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_timeout_secs)
    }
}

impl PeerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address registered with the hub for push delivery.
    pub fn advertised_addr(&self) -> String {
        format!("{}:{}", self.advertise_host, self.port)
    }

    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_secs(self.broadcast_timeout_secs)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{0} must be at least 1 second")]
    ZeroTimeout(&'static str),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl RelayConfig {
    /// Load config: defaults overlaid with `RELAY_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = RelayConfig::default();
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `RELAY_*` overrides read through `lookup`.
    ///
    /// Takes the lookup as a closure so tests never touch process env.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RELAY_HUB__HOST") {
            self.hub.host = v;
        }
        if let Some(v) = lookup("RELAY_HUB__PORT") {
            self.hub.port = parse_var("RELAY_HUB__PORT", v)?;
        }
        if let Some(v) = lookup("RELAY_HUB__PUSH_TIMEOUT_SECS") {
            self.hub.push_timeout_secs = parse_var("RELAY_HUB__PUSH_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("RELAY_PEER__HOST") {
            self.peer.host = v;
        }
        if let Some(v) = lookup("RELAY_PEER__PORT") {
            self.peer.port = parse_var("RELAY_PEER__PORT", v)?;
        }
        if let Some(v) = lookup("RELAY_PEER__SERVER_ADDR") {
            self.peer.server_addr = v;
        }
        if let Some(v) = lookup("RELAY_PEER__ADVERTISE_HOST") {
            self.peer.advertise_host = v;
        }
        if let Some(v) = lookup("RELAY_PEER__BROADCAST_TIMEOUT_SECS") {
            self.peer.broadcast_timeout_secs =
                parse_var("RELAY_PEER__BROADCAST_TIMEOUT_SECS", v)?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.push_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("hub push timeout"));
        }
        if self.peer.broadcast_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("peer broadcast timeout"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
