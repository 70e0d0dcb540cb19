//! Opening adapter links: by port name, or by probing the candidates until
//! one opens.

use std::sync::Arc;
use std::time::Duration;

use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};
use tracing::{debug, info, warn};

use elm_obd::{TransportError, TransportResult};

use crate::connection::{BoxedPort, SerialConnection};

/// Baud rate ELM327 clones ship with.
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// Idle time after which a reply is considered complete.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl PortSettings {
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

/// Opens a named port as an async byte stream.
pub trait PortOpener: Send + Sync {
    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<BoxedPort>;
}

impl<O: PortOpener + ?Sized> PortOpener for Arc<O> {
    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<BoxedPort> {
        (**self).open(path, settings)
    }
}

/// Opens real serial ports through `tokio-serial` (8N1, no flow control).
///
/// Must be called from within a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSerialOpener;

impl PortOpener for TokioSerialOpener {
    fn open(&self, path: &str, settings: &PortSettings) -> TransportResult<BoxedPort> {
        let port = tokio_serial::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open_native_async()
            .map_err(|e| map_serial_error(path, e))?;
        Ok(Box::new(port))
    }
}

fn map_serial_error(path: &str, err: tokio_serial::Error) -> TransportError {
    match err.kind() {
        tokio_serial::ErrorKind::NoDevice
        | tokio_serial::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
            TransportError::DeviceNotFound(path.to_string())
        }
        _ => TransportError::Port(format!("{path}: {err}")),
    }
}

/// Builds [`SerialConnection`]s.
pub struct SerialConnectionFactory<O = TokioSerialOpener> {
    opener: O,
    candidate_ports: Option<Vec<String>>,
}

impl SerialConnectionFactory<TokioSerialOpener> {
    /// Factory for real serial ports; auto-detection scans the system.
    pub fn new() -> Self {
        Self::with_opener(TokioSerialOpener)
    }
}

impl Default for SerialConnectionFactory<TokioSerialOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: PortOpener> SerialConnectionFactory<O> {
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            candidate_ports: None,
        }
    }

    /// Restrict auto-detection to these ports, tried in order.
    pub fn with_candidate_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_ports = Some(ports.into_iter().map(Into::into).collect());
        self
    }

    /// Open `path`. Fails with `DeviceNotFound` if the port does not exist and
    /// `Port` for any other open failure.
    pub fn connect(&self, path: &str, settings: &PortSettings) -> TransportResult<SerialConnection> {
        let port = self.opener.open(path, settings)?;
        info!(port = path, baud_rate = settings.baud_rate, "serial port opened");
        Ok(SerialConnection::new(path, port, settings.read_timeout))
    }

    /// Try every candidate port and return the first that opens, or `None`.
    pub fn auto_connect(&self, settings: &PortSettings) -> Option<SerialConnection> {
        for path in self.candidates() {
            match self.connect(&path, settings) {
                Ok(connection) => return Some(connection),
                Err(e) => warn!(port = %path, error = %e, "port unavailable, trying next"),
            }
        }
        warn!("no serial port could be opened");
        None
    }

    fn candidates(&self) -> Vec<String> {
        if let Some(ports) = &self.candidate_ports {
            return ports.clone();
        }
        match tokio_serial::available_ports() {
            Ok(ports) => {
                let names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
                debug!(count = names.len(), "system serial ports found");
                names
            }
            Err(e) => {
                warn!(error = %e, "could not list system serial ports");
                Vec::new()
            }
        }
    }
}
