//! Adapter response parsing: segment splitting and sentinel classification.
//!
//! One request can produce several `\r`-delimited frames (one per ECU, or
//! echo noise). Each frame is classified independently; the interface
//! decides how classifications combine.

use crate::command::{Command, MODE_CURRENT_DATA, RESPONSE_SID_OFFSET};
use crate::error::ObdResult;
use crate::hex::decode_hex_words;

/// Adapter reply when the request was understood but nothing answered.
pub const NO_DATA: &str = "NO DATA";

/// Adapter reply when it does not understand the request.
pub const UNSUPPORTED_COMMAND: &str = "?";

/// First byte of every accepted value frame, whatever the request mode.
pub const VALUE_ACK: u8 = MODE_CURRENT_DATA + RESPONSE_SID_OFFSET;

/// Classification of one response segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `NO DATA`: nothing available this cycle.
    NoData,
    /// `?`: the command will never be answered.
    Unsupported,
    /// Hex words, possibly empty.
    Words(Vec<u8>),
}

/// Split a raw response into trimmed `\r`-delimited segments.
pub fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('\r').map(str::trim)
}

/// Classify a single segment. Fails only when the segment is neither a
/// sentinel nor valid hex words.
pub fn classify(segment: &str) -> ObdResult<Segment> {
    match segment {
        NO_DATA => Ok(Segment::NoData),
        UNSUPPORTED_COMMAND => Ok(Segment::Unsupported),
        other => decode_hex_words(other).map(Segment::Words),
    }
}

/// Return the payload of a positive response to `command`, if `words` is one.
///
/// Accepted shape: `[0x41, pid, payload...]`. Only the PID is matched
/// against `command`; the ack byte is fixed.
pub fn value_payload<'w>(words: &'w [u8], command: &Command) -> Option<&'w [u8]> {
    match words {
        [VALUE_ACK, pid, payload @ ..] if *pid == command.pid => Some(payload),
        _ => None,
    }
}
