//! Mock ELM327 transport for testing.
//!
//! Supports scripted response queues and request recording. Adapter setup
//! commands (`AT ...`) are answered automatically so tests only script the
//! OBD-II exchanges they care about.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{TransportError, TransportResult};
use crate::transport::Transport;

/// Banner an ELM327 prints after `AT Z`.
pub const RESET_BANNER: &str = "ELM327 v1.5";

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub data: String,
    pub read_delay: Duration,
}

/// Mock transport with scripted responses and request recording.
pub struct MockTransport {
    /// Queued responses for non-AT requests (FIFO order).
    responses: Mutex<VecDeque<String>>,
    /// Every request passed to `send_command`, AT commands included.
    sent: Mutex<Vec<SentCommand>>,
    /// Requests that fail with a transport error instead of answering.
    failures: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    /// Create a new mock with no queued responses.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock pre-loaded with responses.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for response in responses {
            mock.queue_response(response);
        }
        mock
    }

    /// Queue an additional response.
    pub fn queue_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    /// Make every future `data` request fail with `TransportError::Other(message)`.
    pub fn fail_on(&self, data: impl Into<String>, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap()
            .push((data.into(), message.into()));
    }

    /// All requests sent so far.
    pub fn sent_commands(&self) -> Vec<SentCommand> {
        self.sent.lock().unwrap().clone()
    }

    /// Requests sent so far, excluding `AT` setup commands.
    pub fn obd_requests(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !is_at_command(&c.data))
            .map(|c| c.data.clone())
            .collect()
    }

    /// Number of scripted responses not consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn is_at_command(data: &str) -> bool {
    data.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("AT"))
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_command(&self, data: &str, read_delay: Duration) -> TransportResult<String> {
        self.sent.lock().unwrap().push(SentCommand {
            data: data.to_string(),
            read_delay,
        });

        if let Some((_, message)) = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(request, _)| request == data)
        {
            return Err(TransportError::Other(message.clone()));
        }

        if is_at_command(data) {
            let reply = if data.eq_ignore_ascii_case("AT Z") {
                RESET_BANNER
            } else {
                "OK"
            };
            return Ok(reply.to_string());
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(TransportError::Timeout {
                timeout_ms: read_delay.as_millis() as u64,
            })
    }
}
