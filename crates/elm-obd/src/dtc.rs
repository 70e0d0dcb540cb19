//! Diagnostic trouble code extraction (modes 03/07) and clearing (mode 04).
//!
//! The adapter answers a DTC request with the ack byte followed by packed
//! 4-hex-digit codes, e.g. `43 01 33 00 00 02 14`. `0000` is padding.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::command::{MODE_PENDING_DTCS, MODE_STORED_DTCS};
use crate::error::{ObdError, ObdResult, Unavailable};

/// Chunk value the adapter uses to pad unused code slots.
pub const NO_CODE: &str = "0000";

/// Request line for mode 04 (clear DTCs).
pub const CLEAR_REQUEST: &str = "04";

/// Prefix of a positive mode 04 response.
pub const CLEAR_ACK_PREFIX: &str = "44";

/// `NO DATA` as it reads after whitespace has been stripped.
const NO_DATA_STRIPPED: &str = "NODATA";

const CODE_LEN: usize = 4;

/// Which set of trouble codes to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcKind {
    /// Mode 03: codes that have matured and (usually) lit the MIL.
    Confirmed,
    /// Mode 07: codes detected during the current or last drive cycle.
    Pending,
}

impl DtcKind {
    pub fn mode(&self) -> u8 {
        match self {
            DtcKind::Confirmed => MODE_STORED_DTCS,
            DtcKind::Pending => MODE_PENDING_DTCS,
        }
    }

    /// Request line sent to the adapter.
    pub fn request(&self) -> &'static str {
        match self {
            DtcKind::Confirmed => "03",
            DtcKind::Pending => "07",
        }
    }

    /// Prefix every accepted response segment starts with.
    pub fn ack_prefix(&self) -> &'static str {
        match self {
            DtcKind::Confirmed => "43",
            DtcKind::Pending => "47",
        }
    }
}

/// DTC category, from the top two bits of the first code byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcCategory {
    /// P: Powertrain (engine, transmission).
    Powertrain,
    /// C: Chassis (ABS, steering).
    Chassis,
    /// B: Body (airbags, AC, lighting).
    Body,
    /// U: Network/Communication (CAN bus errors).
    Network,
}

impl DtcCategory {
    pub fn letter(&self) -> char {
        match self {
            DtcCategory::Powertrain => 'P',
            DtcCategory::Chassis => 'C',
            DtcCategory::Body => 'B',
            DtcCategory::Network => 'U',
        }
    }
}

/// A trouble code exactly as the adapter reported it: four hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DtcCode(String);

impl DtcCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn bytes(&self) -> Option<(u8, u8)> {
        if self.0.len() != CODE_LEN || !self.0.is_ascii() {
            return None;
        }
        let b1 = u8::from_str_radix(&self.0[..2], 16).ok()?;
        let b2 = u8::from_str_radix(&self.0[2..], 16).ok()?;
        Some((b1, b2))
    }

    /// Category encoded in the code, or `None` if the code is not hex.
    pub fn category(&self) -> Option<DtcCategory> {
        let (b1, _) = self.bytes()?;
        Some(match (b1 >> 6) & 0x03 {
            0 => DtcCategory::Powertrain,
            1 => DtcCategory::Chassis,
            2 => DtcCategory::Body,
            _ => DtcCategory::Network,
        })
    }

    /// SAE J2012 form, e.g. `"0133"` → `"P0133"`, `"C100"` → `"U0100"`.
    pub fn standard_form(&self) -> Option<String> {
        let (b1, b2) = self.bytes()?;
        let category = self.category()?.letter();
        let digit1 = (b1 >> 4) & 0x03;
        let digit2 = b1 & 0x0F;
        Some(format!("{category}{digit1}{digit2:X}{b2:02X}"))
    }
}

impl fmt::Display for DtcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DtcCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Extract trouble codes from a mode 03/07 response.
///
/// Whitespace is stripped before parsing. A response that is nothing but
/// `NO DATA` fails with [`Unavailable::NoData`]; segments that do not carry
/// the expected ack prefix are skipped.
pub fn parse_trouble_codes(raw: &str, kind: DtcKind) -> ObdResult<BTreeSet<DtcCode>> {
    let compact = raw.replace(' ', "");
    let compact = compact.trim();

    if compact == NO_DATA_STRIPPED {
        return Err(ObdError::ValueNotAvailable(Unavailable::NoData {
            request: kind.request(),
        }));
    }

    let mut codes = BTreeSet::new();
    for segment in compact.split('\r').map(str::trim) {
        let Some(mut rest) = segment.strip_prefix(kind.ack_prefix()) else {
            trace!(segment, "ignoring segment without DTC ack prefix");
            continue;
        };

        while !rest.is_empty() {
            let Some(chunk) = rest.get(..CODE_LEN) else {
                debug!(remainder = rest, "dropping partial DTC chunk");
                break;
            };
            if chunk != NO_CODE {
                codes.insert(DtcCode::new(chunk));
            }
            rest = &rest[CODE_LEN..];
        }
    }

    Ok(codes)
}

/// True when a mode 04 response acknowledges the clear.
pub fn is_clear_acknowledged(raw: &str) -> bool {
    raw.starts_with(CLEAR_ACK_PREFIX)
}
