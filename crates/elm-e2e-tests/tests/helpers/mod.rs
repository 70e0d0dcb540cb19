//! Shared test harness for E2E tests.
//!
//! Runs a simulated ELM327 on one end of an in-memory duplex stream and a
//! real `SerialConnection` + `ObdInterface` on the other, so every test
//! crosses the serial framing, protocol, and scanner layers.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use elm_obd::{InterfaceOptions, ObdInterface, ObdResult};
use elm_serial::SerialConnection;

pub const BANNER: &str = "ELM327 v2.1";

/// How long the host waits for the first byte of a reply.
pub const FIRST_BYTE_WAIT: Duration = Duration::from_millis(200);

pub type SimulatedLink = SerialConnection<DuplexStream>;

/// What the simulated adapter answers, per request line.
///
/// Each request has a queue of replies; the last one repeats. Unscripted
/// OBD requests get `?`.
#[derive(Debug, Default, Clone)]
pub struct AdapterScript {
    replies: HashMap<String, VecDeque<String>>,
    hang_up_on: Option<String>,
}

impl AdapterScript {
    pub fn new() -> Self {
        Self::default()
            .reply("AT Z", BANNER)
            .reply("AT E0", "OK")
    }

    /// Queue a reply for `request`. Multi-frame replies use `\r` between frames.
    pub fn reply(mut self, request: &str, reply: &str) -> Self {
        self.replies
            .entry(request.to_string())
            .or_default()
            .push_back(reply.to_string());
        self
    }

    /// Close the line instead of answering `request`.
    pub fn hang_up_on(mut self, request: &str) -> Self {
        self.hang_up_on = Some(request.to_string());
        self
    }

    fn answer(&mut self, request: &str) -> String {
        match self.replies.get_mut(request) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => "?".to_string(),
        }
    }
}

/// Request lines the simulated adapter received, in order.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Requests other than `AT` setup commands.
    pub fn obd(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|r| !r.starts_with("AT"))
            .collect()
    }

    pub fn count(&self, request: &str) -> usize {
        self.all().iter().filter(|r| *r == request).count()
    }
}

/// Spawn the simulated adapter and return the host end of the line.
pub fn simulated_link(script: AdapterScript) -> (SimulatedLink, RequestLog, JoinHandle<()>) {
    let (host, adapter) = tokio::io::duplex(1024);
    let log = RequestLog::default();
    let task = tokio::spawn(run_adapter(adapter, script, log.clone()));
    let link = SerialConnection::new("sim0", host, FIRST_BYTE_WAIT);
    (link, log, task)
}

async fn run_adapter(mut line: DuplexStream, mut script: AdapterScript, log: RequestLog) {
    let mut pending = Vec::new();
    let mut buf = [0u8; 128];
    loop {
        let n = match line.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        pending.extend_from_slice(&buf[..n]);

        while let Some(end) = pending.iter().position(|b| *b == b'\r') {
            let request: Vec<u8> = pending.drain(..=end).collect();
            let request = String::from_utf8_lossy(&request[..end]).trim().to_string();
            log.0.lock().unwrap().push(request.clone());

            if script.hang_up_on.as_deref() == Some(request.as_str()) {
                return;
            }

            let reply = format!("{}\r\r>", script.answer(&request));
            if line.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// A connected, initialized session against the simulated adapter.
pub struct TestHarness {
    pub obd: ObdInterface<SimulatedLink>,
    pub requests: RequestLog,
    pub adapter: JoinHandle<()>,
}

impl TestHarness {
    /// Connect with no settle delay; replies are read as soon as they arrive.
    pub async fn connect(script: AdapterScript) -> ObdResult<Self> {
        let (link, requests, adapter) = simulated_link(script);
        let options = InterfaceOptions {
            read_delay: Duration::ZERO,
            response_hook: None,
        };
        let obd = ObdInterface::connect_with(link, options).await?;
        Ok(Self {
            obd,
            requests,
            adapter,
        })
    }
}
