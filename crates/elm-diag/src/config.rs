//! Scanner configuration, loadable from TOML.

use std::time::Duration;

use serde::Deserialize;

use elm_serial::PortSettings;

/// Top-level configuration for the scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagConfig {
    /// Serial link settings.
    #[serde(default)]
    pub serial: SerialConfig,
    /// Settle time between writing a request and reading the reply.
    #[serde(default = "default_read_delay_ms")]
    pub read_delay_ms: u64,
    /// Mode 01 PIDs to read, in order.
    #[serde(default = "default_pids")]
    pub pids: Vec<u8>,
    /// Also read pending (mode 07) trouble codes.
    #[serde(default = "default_true")]
    pub read_pending_dtcs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    /// Port path (e.g. "/dev/ttyUSB0"). None auto-detects.
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Ports tried by auto-detection. Empty scans the system.
    #[serde(default)]
    pub candidate_ports: Vec<String>,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_read_delay_ms() -> u64 {
    1000
}

fn default_pids() -> Vec<u8> {
    vec![0x0C, 0x0D, 0x05]
}

fn default_true() -> bool {
    true
}

fn default_baud_rate() -> u32 {
    elm_serial::DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    100
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            candidate_ports: Vec::new(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            read_delay_ms: default_read_delay_ms(),
            pids: default_pids(),
            read_pending_dtcs: true,
        }
    }
}

impl DiagConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn read_delay(&self) -> Duration {
        Duration::from_millis(self.read_delay_ms)
    }
}

impl SerialConfig {
    pub fn port_settings(&self) -> PortSettings {
        PortSettings {
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}
