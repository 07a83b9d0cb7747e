//! Process lifecycle — one cancellation context per process, with a reason.
//!
//! The OS signal watcher and every fatal local failure race to trigger the
//! same [`Shutdown`]. The first trigger wins and fixes the reason that gets
//! logged; later ones are ignored. Nothing is drained afterwards, the binary
//! exits as soon as `triggered()` resolves.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Why a process is going down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / SIGTERM (ctrl-c on non-unix).
    Signal(&'static str),
    /// The message source reached end of input.
    InputClosed,
    /// Reading the message source failed.
    InputFailed(String),
    /// Any other unrecoverable local condition.
    Fatal(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(name) => write!(f, "received {}", name),
            ShutdownReason::InputClosed => write!(f, "input closed"),
            ShutdownReason::InputFailed(e) => write!(f, "input failed: {}", e),
            ShutdownReason::Fatal(e) => write!(f, "fatal error: {}", e),
        }
    }
}

/// Cloneable handle to the process-wide cancellation context.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel with `reason`. Returns `false` if something else already did.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let label = reason.to_string();
        let won = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });

        if won {
            tracing::debug!(reason = %label, "shutdown triggered");
        } else {
            tracing::debug!(reason = %label, "shutdown already triggered, ignoring");
        }
        won
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.tx.borrow().clone()
    }

    /// Resolve once triggered, with the winning reason.
    pub async fn triggered(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(reason) = current {
                return reason;
            }
            // `self` keeps the sender alive, so the channel cannot close here.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Spawn the OS signal watcher for this context.
    pub fn watch_signals(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(name) => {
                    tracing::info!(signal = name, "shutdown signal received");
                    shutdown.trigger(ShutdownReason::Signal(name));
                }
                Err(e) => tracing::warn!(error = %e, "failed to install signal handler"),
            }
        })
    }
}

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Wait for ctrl-c.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
