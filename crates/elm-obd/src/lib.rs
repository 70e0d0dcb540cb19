//! ELM327 OBD-II protocol layer.
//!
//! Encodes diagnostic requests as ASCII hex command lines, parses adapter
//! responses, and tracks session state:
//! - `Transport` trait for the adapter link (mockable in tests)
//! - `ObdInterface` for value reads, DTC read/clear, unsupported-command cache
//! - `ValueDefinition` / `ValueDecoder` for caller-supplied parameters
//! - `MockTransport` for testing without an adapter

pub mod command;
pub mod dtc;
pub mod error;
pub mod hex;
pub mod interface;
pub mod mock;
pub mod pids;
pub mod response;
pub mod transport;
pub mod value;

// Re-exports for convenience.
pub use command::Command;
pub use dtc::{DtcCategory, DtcCode, DtcKind};
pub use error::{ObdError, ObdResult, TransportError, TransportResult, Unavailable};
pub use interface::{InterfaceOptions, ObdInterface, ResponseHook};
pub use mock::MockTransport;
pub use transport::Transport;
pub use value::{ValueDecoder, ValueDefinition};
