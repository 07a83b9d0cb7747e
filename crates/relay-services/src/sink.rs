//! Local output sink — where a peer renders pushed messages and prompts.

use std::io::{self, Write};
use std::sync::Mutex;

use relay_core::ChatMessage;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write to console: {0}")]
    Io(#[from] io::Error),
}

/// Console-equivalent output for a peer.
///
/// Writes are short and synchronous; implementations must not block
/// indefinitely since push handlers call straight into them.
pub trait MessageSink: Send + Sync {
    /// Render a message pushed by the hub. `local_username` is the peer's own
    /// name once known, used to redraw its input prompt.
    fn deliver(
        &self,
        message: &ChatMessage,
        local_username: Option<&str>,
    ) -> Result<(), SinkError>;

    /// Write prompt text with no trailing newline.
    fn prompt(&self, text: &str) -> Result<(), SinkError>;
}

/// Line-oriented console writer.
pub struct ConsoleSink<W> {
    out: Mutex<W>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|p| p.into_inner())
    }

    fn write_with<F>(&self, f: F) -> Result<(), SinkError>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut *out)?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> MessageSink for ConsoleSink<W> {
    fn deliver(
        &self,
        message: &ChatMessage,
        local_username: Option<&str>,
    ) -> Result<(), SinkError> {
        self.write_with(|out| {
            write!(out, "\n{}: {}\n", message.sender, message.text)?;
            if let Some(me) = local_username {
                write!(out, "{}: ", me)?;
            }
            Ok(())
        })
    }

    fn prompt(&self, text: &str) -> Result<(), SinkError> {
        self.write_with(|out| out.write_all(text.as_bytes()))
    }
}
