//! Caller-supplied value definitions: which command to send and how to turn
//! its payload into a domain value.

use std::fmt;

use crate::command::Command;

/// Turns the payload of a positive response (bytes after the ack and PID)
/// into a value.
///
/// Returning `None` means "acknowledged but nothing usable here"; the
/// interface then moves on to the next response segment.
pub trait ValueDecoder<V> {
    fn decode(&self, payload: &[u8]) -> Option<V>;
}

impl<V, F> ValueDecoder<V> for F
where
    F: Fn(&[u8]) -> Option<V>,
{
    fn decode(&self, payload: &[u8]) -> Option<V> {
        self(payload)
    }
}

/// A diagnostic parameter: a command plus the decoder for its response.
pub struct ValueDefinition<V> {
    name: String,
    command: Command,
    decoder: Box<dyn ValueDecoder<V> + Send + Sync>,
}

impl<V> ValueDefinition<V> {
    pub fn new(
        name: impl Into<String>,
        command: Command,
        decoder: impl ValueDecoder<V> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            command,
            decoder: Box::new(decoder),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn decode(&self, payload: &[u8]) -> Option<V> {
        self.decoder.decode(payload)
    }
}

impl<V> fmt::Debug for ValueDefinition<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDefinition")
            .field("name", &self.name)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Celsius;

    impl ValueDecoder<i16> for Celsius {
        fn decode(&self, payload: &[u8]) -> Option<i16> {
            payload.first().map(|a| *a as i16 - 40)
        }
    }

    #[test]
    fn closure_decoder() {
        let def = ValueDefinition::new("rpm", Command::new(0x01, 0x0C), |b: &[u8]| match b {
            [a, b, ..] => Some(u16::from(*a) * 256 + u16::from(*b)),
            _ => None,
        });
        assert_eq!(def.decode(&[0x1A, 0xF8]), Some(6904));
        assert_eq!(def.decode(&[0x1A]), None);
        assert_eq!(def.command(), Command::new(0x01, 0x0C));
        assert_eq!(def.name(), "rpm");
    }

    #[test]
    fn struct_decoder() {
        let def = ValueDefinition::new("coolant", Command::new(0x01, 0x05), Celsius);
        assert_eq!(def.decode(&[130]), Some(90));
        assert_eq!(def.decode(&[]), None);
    }

    #[test]
    fn debug_skips_decoder() {
        let def = ValueDefinition::new("speed", Command::new(0x01, 0x0D), |b: &[u8]| {
            b.first().copied()
        });
        let dbg = format!("{def:?}");
        assert!(dbg.contains("speed"));
        assert!(dbg.contains("pid: 13"));
    }
}
