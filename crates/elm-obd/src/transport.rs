//! Transport abstraction between the protocol layer and the adapter link.
//!
//! `Transport` trait with a single `send_command`. Implementations:
//! - `SerialConnection` in `elm-serial`: a real ELM327 on a serial port
//! - `MockTransport`: scripted responses for tests (in `mock.rs`)

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportResult;

/// Trait for ELM327 adapter links.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write `data` followed by a carriage return, wait `read_delay`, and
    /// return everything the adapter sent back. Frames inside the returned
    /// string stay separated by `\r`.
    async fn send_command(&self, data: &str, read_delay: Duration) -> TransportResult<String>;
}
