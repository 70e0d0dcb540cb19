//! Serial link to an ELM327 adapter.
//!
//! - `SerialConnection` implements `elm_obd::Transport` over any async byte stream
//! - `SerialConnectionFactory` opens ports by name or probes candidates

mod connection;
mod factory;

pub use connection::{
    AsyncPort, BoxedPort, DEFAULT_REPLY_TIMEOUT, PROMPT, SEARCHING, SerialConnection,
};
pub use factory::{
    DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, PortOpener, PortSettings, SerialConnectionFactory,
    TokioSerialOpener,
};
