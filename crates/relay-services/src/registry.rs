//! Client registry — tracks registered peers and how to reach them.
//!
//! Owned by the hub for its whole lifetime. Registrations write to it, every
//! broadcast reads a snapshot of it. Records are never removed: a peer that
//! goes away leaves a stale record whose pushes fail.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::service::PushClient;

/// One registered peer.
#[derive(Clone)]
pub struct ClientRecord {
    pub username: String,

    /// `host:port` of the peer's inbound endpoint.
    pub addr: String,

    /// Push stub bound to `addr`.
    pub outbound: Arc<dyn PushClient>,

    pub registered_at: Instant,
}

impl ClientRecord {
    pub fn new(
        username: impl Into<String>,
        addr: impl Into<String>,
        outbound: Arc<dyn PushClient>,
    ) -> Self {
        Self {
            username: username.into(),
            addr: addr.into(),
            outbound,
            registered_at: Instant::now(),
        }
    }
}

impl fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRecord")
            .field("username", &self.username)
            .field("addr", &self.addr)
            .field("registered_at", &self.registered_at)
            .finish_non_exhaustive()
    }
}

/// Username → client record, safe to share across request handlers.
///
/// Each entry is replaced whole, so a reader sees either the old record or
/// the new one, never a mix.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<DashMap<String, ClientRecord>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Insert `record`, replacing any record already held under its username.
    /// Returns the replaced record.
    pub fn store(&self, record: ClientRecord) -> Option<ClientRecord> {
        self.clients.insert(record.username.clone(), record)
    }

    /// Walk every entry until `visit` returns `false`.
    ///
    /// Order is unspecified. Stores racing with the walk may or may not be
    /// seen. `visit` must not call back into the registry: the entry's shard
    /// is read-locked while it runs.
    pub fn visit<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &ClientRecord) -> bool,
    {
        for entry in self.clients.iter() {
            if !visit(entry.key(), entry.value()) {
                break;
            }
        }
    }

    /// Clone every record out. No locks are held once this returns.
    pub fn snapshot(&self) -> Vec<ClientRecord> {
        let mut records = Vec::with_capacity(self.clients.len());
        self.visit(|_, record| {
            records.push(record.clone());
            true
        });
        records
    }

    pub fn get(&self, username: &str) -> Option<ClientRecord> {
        self.clients.get(username).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
