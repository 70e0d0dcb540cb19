//! `Transport` over a byte stream connected to an ELM327.
//!
//! The adapter terminates every reply with a `>` prompt. Replies are read
//! until the prompt shows up, the stream ends, or the reply deadline passes.
//! Idle gaps inside a reply (protocol search) do not end it.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use elm_obd::{Transport, TransportError, TransportResult};

/// Prompt the adapter prints when it is ready for the next command.
pub const PROMPT: u8 = b'>';

/// Status line printed while the adapter detects the vehicle protocol.
pub const SEARCHING: &str = "SEARCHING...";

/// Longest a started reply may take to reach the prompt.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Any async byte stream usable as an adapter link.
pub trait AsyncPort: AsyncRead + AsyncWrite + Unpin + Send {}

impl<P: AsyncRead + AsyncWrite + Unpin + Send> AsyncPort for P {}

/// Type-erased port, as produced by a [`PortOpener`](crate::PortOpener).
pub type BoxedPort = Box<dyn AsyncPort>;

/// An open link to an ELM327 adapter.
pub struct SerialConnection<P = BoxedPort> {
    port_name: String,
    port: Mutex<P>,
    read_timeout: Duration,
    reply_timeout: Duration,
}

impl<P: AsyncPort> SerialConnection<P> {
    /// Wrap an already-open port. `read_timeout` is how long the line may stay
    /// silent before the first byte of a reply.
    pub fn new(port_name: impl Into<String>, port: P, read_timeout: Duration) -> Self {
        Self {
            port_name: port_name.into(),
            port: Mutex::new(port),
            read_timeout,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Cap on a reply that started but never reaches the prompt.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }
}

/// Discard whatever is already buffered on the line without waiting.
async fn drain_stale<P: AsyncPort>(port: &mut P) -> TransportResult<usize> {
    let mut discarded = 0;
    let mut buf = [0u8; 256];
    loop {
        match tokio::time::timeout(Duration::ZERO, port.read(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => return Ok(discarded),
            Ok(Ok(n)) => discarded += n,
            Ok(Err(e)) => return Err(e.into()),
        }
    }
}

#[async_trait]
impl<P: AsyncPort> Transport for SerialConnection<P> {
    async fn send_command(&self, data: &str, read_delay: Duration) -> TransportResult<String> {
        let mut port = self.port.lock().await;

        let stale = drain_stale(&mut *port).await?;
        if stale > 0 {
            debug!(port = %self.port_name, bytes = stale, "discarded stale input");
        }

        port.write_all(format!("{data}\r").as_bytes()).await?;
        port.flush().await?;

        tokio::time::sleep(read_delay).await;

        let deadline = Instant::now() + self.reply_timeout;
        let mut received = Vec::with_capacity(64);
        let mut buf = [0u8; 256];
        loop {
            match tokio::time::timeout(self.read_timeout, port.read(&mut buf)).await {
                Ok(Ok(0)) => {
                    if received.is_empty() {
                        return Err(TransportError::Closed);
                    }
                    break;
                }
                Ok(Ok(n)) => {
                    received.extend_from_slice(&buf[..n]);
                    if received.contains(&PROMPT) {
                        break;
                    }
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) if received.is_empty() || Instant::now() >= deadline => break,
                Err(_) => trace!(port = %self.port_name, "reply paused before prompt"),
            }
        }

        if received.is_empty() {
            return Err(TransportError::Timeout {
                timeout_ms: (read_delay + self.read_timeout).as_millis() as u64,
            });
        }

        trace!(port = %self.port_name, bytes = received.len(), "reply received");
        Ok(clean_reply(&received))
    }
}

/// Drop linefeeds, the prompt and `SEARCHING...` status lines, and trim the
/// surrounding line breaks.
fn clean_reply(raw: &[u8]) -> String {
    let text: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|c| *c != '\n' && *c != PROMPT as char)
        .collect();
    text.split('\r')
        .filter(|line| line.trim() != SEARCHING)
        .collect::<Vec<_>>()
        .join("\r")
        .trim()
        .to_string()
}
