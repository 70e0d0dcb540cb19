//! ELM327 session: value reads, trouble codes, and the unsupported-command
//! cache.
//!
//! One `ObdInterface` drives one adapter link. Every operation performs a
//! single request/response exchange and consumes the whole response before
//! returning. Mutating operations take `&mut self`, so callers cannot
//! interleave requests on the same session.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::command::Command;
use crate::dtc::{self, DtcCode, DtcKind};
use crate::error::{ObdError, ObdResult, Unavailable};
use crate::response::{self, Segment};
use crate::transport::Transport;
use crate::value::ValueDefinition;

/// Post-send delay used when none is configured.
pub const DEFAULT_READ_DELAY: Duration = Duration::from_secs(1);

/// Reset the adapter to defaults.
pub const AT_RESET: &str = "AT Z";

/// Turn off command echo so responses contain only adapter output.
pub const AT_ECHO_OFF: &str = "AT E0";

/// Callback invoked with every raw adapter response.
pub type ResponseHook = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Session options.
pub struct InterfaceOptions {
    /// How long the transport waits after writing a request.
    pub read_delay: Duration,
    /// Observer for raw exchanges, called as `hook(request, response)`.
    pub response_hook: Option<ResponseHook>,
}

impl Default for InterfaceOptions {
    fn default() -> Self {
        Self {
            read_delay: DEFAULT_READ_DELAY,
            response_hook: None,
        }
    }
}

impl fmt::Debug for InterfaceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceOptions")
            .field("read_delay", &self.read_delay)
            .field("response_hook", &self.response_hook.is_some())
            .finish()
    }
}

/// An initialized ELM327 session over a transport.
pub struct ObdInterface<T> {
    transport: T,
    unsupported: HashSet<Command>,
    read_delay: Duration,
    response_hook: Option<ResponseHook>,
}

impl<T: Transport> ObdInterface<T> {
    /// Initialize the adapter on an already-open transport with default options.
    pub async fn connect(transport: T) -> ObdResult<Self> {
        Self::connect_with(transport, InterfaceOptions::default()).await
    }

    /// Initialize the adapter (`AT Z`, then `AT E0`) on an already-open
    /// transport. Fails if either setup command fails.
    pub async fn connect_with(transport: T, options: InterfaceOptions) -> ObdResult<Self> {
        let interface = Self {
            transport,
            unsupported: HashSet::new(),
            read_delay: options.read_delay,
            response_hook: options.response_hook,
        };

        let banner = interface.send_command(AT_RESET, interface.read_delay).await?;
        interface.send_command(AT_ECHO_OFF, interface.read_delay).await?;
        info!(banner = %banner.trim(), "ELM327 adapter initialized");

        Ok(interface)
    }

    /// Send one raw line and return the raw response.
    pub async fn send_command(&self, data: &str, read_delay: Duration) -> ObdResult<String> {
        let response = self.transport.send_command(data, read_delay).await?;
        debug!(
            request = data,
            response = %response.replace('\r', "\\r"),
            "adapter exchange"
        );
        if let Some(hook) = &self.response_hook {
            hook(data, &response);
        }
        Ok(response)
    }

    /// Read one value.
    ///
    /// Returns `Ok(None)` when the adapter has no data this cycle or no
    /// segment carried a decodable payload. Fails with
    /// [`ObdError::ValueNotAvailable`] when the adapter does not support the
    /// command; that verdict is remembered and later reads fail immediately.
    pub async fn read_value<V>(&mut self, definition: &ValueDefinition<V>) -> ObdResult<Option<V>> {
        let command = definition.command();
        if self.unsupported.contains(&command) {
            return Err(ObdError::ValueNotAvailable(Unavailable::Unsupported(command)));
        }

        let raw = self
            .send_command(&command.request_line(), self.read_delay)
            .await?;

        for segment in response::segments(&raw) {
            match response::classify(segment)? {
                Segment::NoData => {
                    trace!(%command, "adapter reported no data");
                }
                Segment::Unsupported => {
                    warn!(%command, value = definition.name(), "command not supported by adapter");
                    self.unsupported.insert(command);
                    return Err(ObdError::ValueNotAvailable(Unavailable::Unsupported(command)));
                }
                Segment::Words(words) => match response::value_payload(&words, &command) {
                    Some(payload) => {
                        if let Some(value) = definition.decode(payload) {
                            return Ok(Some(value));
                        }
                        trace!(%command, segment, "segment acknowledged without usable payload");
                    }
                    None => {
                        trace!(%command, segment, "ignoring non-matching segment");
                    }
                },
            }
        }

        Ok(None)
    }

    /// Read confirmed (mode 03) or pending (mode 07) trouble codes.
    pub async fn read_trouble_codes(&self, kind: DtcKind) -> ObdResult<BTreeSet<DtcCode>> {
        let raw = self.send_command(kind.request(), self.read_delay).await?;
        let codes = dtc::parse_trouble_codes(&raw, kind)?;
        debug!(?kind, count = codes.len(), "trouble codes read");
        Ok(codes)
    }

    /// Clear trouble codes (mode 04). `Ok(false)` means the adapter did not
    /// acknowledge the clear.
    pub async fn clear_trouble_codes(&self) -> ObdResult<bool> {
        let raw = self.send_command(dtc::CLEAR_REQUEST, self.read_delay).await?;
        let cleared = dtc::is_clear_acknowledged(&raw);
        if cleared {
            info!("trouble codes cleared");
        } else {
            warn!("adapter did not acknowledge clear request");
        }
        Ok(cleared)
    }

    /// True once the adapter has answered `?` for `command` in this session.
    pub fn is_unsupported(&self, command: &Command) -> bool {
        self.unsupported.contains(command)
    }

    /// Commands found unsupported so far, in no particular order.
    pub fn unsupported_commands(&self) -> impl Iterator<Item = &Command> {
        self.unsupported.iter()
    }

    pub fn read_delay(&self) -> Duration {
        self.read_delay
    }

    pub fn set_read_delay(&mut self, read_delay: Duration) {
        self.read_delay = read_delay;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
