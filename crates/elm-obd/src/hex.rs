//! Hex word codec for the ELM327 ASCII protocol.
//!
//! The adapter speaks in two-character hex words separated by spaces
//! (`41 0C 1A F8`). Requests are always written uppercase and zero-padded.

use crate::error::{ObdError, ObdResult};

/// Format a byte as a hex word.
///
/// Plain form is two uppercase digits (`0C`); pretty form is `0x` followed by
/// two lowercase digits (`0x0c`).
pub fn encode_hex_word(value: u8, pretty: bool) -> String {
    if pretty {
        format!("{value:#04x}")
    } else {
        format!("{value:02X}")
    }
}

/// Decode a whitespace-separated line of hex words into bytes.
pub fn decode_hex_words(line: &str) -> ObdResult<Vec<u8>> {
    line.split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 16).map_err(|_| ObdError::MalformedResponse {
                segment: line.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}
