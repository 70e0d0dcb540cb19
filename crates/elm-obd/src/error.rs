//! OBD-II protocol and transport error types.

use std::fmt;

use thiserror::Error;

use crate::command::Command;

/// Errors raised by a [`Transport`](crate::transport::Transport) implementation.
///
/// The protocol layer never interprets these; they reach the caller unchanged
/// inside [`ObdError::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("serial port error: {0}")]
    Port(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("no response from adapter after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection closed by adapter")]
    Closed,

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Convenience alias for transport results.
pub type TransportResult<T> = Result<T, TransportError>;

/// Why a value could not be obtained from the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The adapter answered `?`. Memoized for the rest of the session.
    Unsupported(Command),
    /// The adapter answered `NO DATA` to a request that requires data.
    NoData { request: &'static str },
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Unsupported(command) => write!(f, "{command} is not supported"),
            Unavailable::NoData { request } => write!(f, "no data for request {request}"),
        }
    }
}

/// Errors that can occur while talking OBD-II through an ELM327 adapter.
#[derive(Debug, Error)]
pub enum ObdError {
    #[error("value not available: {0}")]
    ValueNotAvailable(Unavailable),

    #[error("malformed response: {token:?} is not a hex word in {segment:?}")]
    MalformedResponse { segment: String, token: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ObdError {
    /// True when the adapter declared the value unavailable (`?` or no data).
    pub fn is_value_not_available(&self) -> bool {
        matches!(self, ObdError::ValueNotAvailable(_))
    }
}

/// Convenience alias for OBD-II results.
pub type ObdResult<T> = Result<T, ObdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_names_command() {
        let err = ObdError::ValueNotAvailable(Unavailable::Unsupported(Command::new(0x01, 0x0C)));
        assert_eq!(
            err.to_string(),
            "value not available: Command(mode=0x01, pid=0x0c) is not supported"
        );
        assert!(err.is_value_not_available());
    }

    #[test]
    fn transport_error_is_transparent() {
        let err: ObdError = TransportError::DeviceNotFound("/dev/ttyUSB9".into()).into();
        assert_eq!(err.to_string(), "device not found: /dev/ttyUSB9");
        assert!(!err.is_value_not_available());
    }

    #[test]
    fn io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = TransportError::from(io);
        assert!(matches!(err, TransportError::Io(ref msg) if msg.contains("pipe closed")));
    }
}
