//! OBD-II request identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::encode_hex_word;

// ── OBD-II Modes ────────────────────────────────────────────────

/// Mode 01: Show current data (live PIDs).
pub const MODE_CURRENT_DATA: u8 = 0x01;

/// Mode 03: Show stored (confirmed) DTCs.
pub const MODE_STORED_DTCS: u8 = 0x03;

/// Mode 04: Clear DTCs and stored values.
pub const MODE_CLEAR_DTCS: u8 = 0x04;

/// Mode 07: Show pending DTCs.
pub const MODE_PENDING_DTCS: u8 = 0x07;

/// Offset added to request mode to get the positive response byte.
pub const RESPONSE_SID_OFFSET: u8 = 0x40;

/// An OBD-II request: service mode plus parameter ID.
///
/// Commands are plain values. Two commands with the same mode and PID are the
/// same command, so they can key the interface's unsupported-command cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub mode: u8,
    pub pid: u8,
}

impl Command {
    pub const fn new(mode: u8, pid: u8) -> Self {
        Self { mode, pid }
    }

    /// Mode and PID as hex words.
    pub fn to_hex_words(&self, pretty: bool) -> (String, String) {
        (
            encode_hex_word(self.mode, pretty),
            encode_hex_word(self.pid, pretty),
        )
    }

    /// The request line sent to the adapter, e.g. `"01 0C"`.
    pub fn request_line(&self) -> String {
        let (mode, pid) = self.to_hex_words(false);
        format!("{mode} {pid}")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mode, pid) = self.to_hex_words(true);
        write!(f, "Command(mode={mode}, pid={pid})")
    }
}
