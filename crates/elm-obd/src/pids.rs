//! Common mode 01 parameters and their decoding formulas (SAE J1979).
//!
//! Vehicle-specific tables stay with the caller; these are the parameters
//! nearly every ECU answers.

use std::fmt;

use crate::command::{Command, MODE_CURRENT_DATA};
use crate::value::ValueDefinition;

/// A standard mode 01 parameter.
#[derive(Clone, Copy)]
pub struct StandardPid {
    pub pid: u8,
    pub name: &'static str,
    pub unit: &'static str,
    decode: fn(&[u8]) -> Option<f64>,
}

impl StandardPid {
    pub fn command(&self) -> Command {
        Command::new(MODE_CURRENT_DATA, self.pid)
    }

    pub fn decode(&self, payload: &[u8]) -> Option<f64> {
        (self.decode)(payload)
    }

    /// Value definition suitable for `ObdInterface::read_value`.
    pub fn definition(&self) -> ValueDefinition<f64> {
        ValueDefinition::new(self.name, self.command(), self.decode)
    }
}

impl fmt::Debug for StandardPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardPid")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

fn a(bytes: &[u8]) -> Option<f64> {
    bytes.first().map(|a| *a as f64)
}

fn ab(bytes: &[u8]) -> Option<f64> {
    match bytes {
        [a, b, ..] => Some(*a as f64 * 256.0 + *b as f64),
        _ => None,
    }
}

fn percent(bytes: &[u8]) -> Option<f64> {
    a(bytes).map(|a| a * 100.0 / 255.0)
}

fn temperature(bytes: &[u8]) -> Option<f64> {
    a(bytes).map(|a| a - 40.0)
}

fn fuel_trim(bytes: &[u8]) -> Option<f64> {
    a(bytes).map(|a| (a - 128.0) * 100.0 / 128.0)
}

/// Parameters in PID order.
pub const STANDARD_PIDS: &[StandardPid] = &[
    StandardPid {
        pid: 0x04,
        name: "Engine Load",
        unit: "%",
        decode: percent,
    },
    StandardPid {
        pid: 0x05,
        name: "Coolant Temperature",
        unit: "°C",
        decode: temperature,
    },
    StandardPid {
        pid: 0x06,
        name: "Short Term Fuel Trim B1",
        unit: "%",
        decode: fuel_trim,
    },
    StandardPid {
        pid: 0x07,
        name: "Long Term Fuel Trim B1",
        unit: "%",
        decode: fuel_trim,
    },
    StandardPid {
        pid: 0x0B,
        name: "Intake MAP",
        unit: "kPa",
        decode: a,
    },
    StandardPid {
        pid: 0x0C,
        name: "Engine RPM",
        unit: "rpm",
        decode: |b| ab(b).map(|v| v / 4.0),
    },
    StandardPid {
        pid: 0x0D,
        name: "Vehicle Speed",
        unit: "km/h",
        decode: a,
    },
    StandardPid {
        pid: 0x0E,
        name: "Timing Advance",
        unit: "°",
        decode: |b| a(b).map(|v| v / 2.0 - 64.0),
    },
    StandardPid {
        pid: 0x0F,
        name: "Intake Air Temp",
        unit: "°C",
        decode: temperature,
    },
    StandardPid {
        pid: 0x10,
        name: "MAF Rate",
        unit: "g/s",
        decode: |b| ab(b).map(|v| v / 100.0),
    },
    StandardPid {
        pid: 0x11,
        name: "Throttle Position",
        unit: "%",
        decode: percent,
    },
    StandardPid {
        pid: 0x1F,
        name: "Runtime Since Start",
        unit: "s",
        decode: ab,
    },
    StandardPid {
        pid: 0x2F,
        name: "Fuel Level",
        unit: "%",
        decode: percent,
    },
    StandardPid {
        pid: 0x33,
        name: "Barometric Pressure",
        unit: "kPa",
        decode: a,
    },
    StandardPid {
        pid: 0x42,
        name: "Control Module Voltage",
        unit: "V",
        decode: |b| ab(b).map(|v| v / 1000.0),
    },
    StandardPid {
        pid: 0x46,
        name: "Ambient Air Temp",
        unit: "°C",
        decode: temperature,
    },
];

/// Look up a standard mode 01 parameter by PID.
pub fn lookup(pid: u8) -> Option<&'static StandardPid> {
    STANDARD_PIDS.iter().find(|p| p.pid == pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(pid: u8, payload: &[u8]) -> Option<f64> {
        lookup(pid).unwrap().decode(payload)
    }

    #[test]
    fn rpm() {
        let v = decode(0x0C, &[0x36, 0xB0]).unwrap();
        assert!((v - 3500.0).abs() < 0.01);
    }

    #[test]
    fn speed() {
        assert_eq!(decode(0x0D, &[0x3C]), Some(60.0));
    }

    #[test]
    fn coolant_temp() {
        assert_eq!(decode(0x05, &[130]), Some(90.0));
    }

    #[test]
    fn engine_load() {
        let v = decode(0x04, &[127]).unwrap();
        assert!((v - 49.803).abs() < 0.01);
    }

    #[test]
    fn fuel_trim_is_signed() {
        assert_eq!(decode(0x06, &[0x80]), Some(0.0));
        assert_eq!(decode(0x07, &[0x90]), Some(12.5));
    }

    #[test]
    fn module_voltage() {
        let v = decode(0x42, &[0x36, 0x0C]).unwrap();
        assert!((v - 13.836).abs() < 0.001);
    }

    #[test]
    fn short_payload_is_none() {
        assert_eq!(decode(0x0C, &[0x36]), None);
        assert_eq!(decode(0x0D, &[]), None);
    }

    #[test]
    fn unknown_pid() {
        assert!(lookup(0xFF).is_none());
    }

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(STANDARD_PIDS.windows(2).all(|w| w[0].pid < w[1].pid));
    }

    #[test]
    fn definition_targets_mode_01() {
        let def = lookup(0x0C).unwrap().definition();
        assert_eq!(def.command(), Command::new(0x01, 0x0C));
        assert_eq!(def.name(), "Engine RPM");
        assert_eq!(def.decode(&[0x1A, 0xF8]), Some(1726.0));
    }
}
