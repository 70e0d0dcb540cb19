//! elm-diag: one-shot OBD-II scan through an ELM327 adapter.
//!
//! Usage: `elm-diag [CONFIG_PATH] [--clear-dtcs]`

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use elm_diag::config::DiagConfig;
use elm_diag::scan;
use elm_obd::{InterfaceOptions, ObdInterface};
use elm_serial::SerialConnectionFactory;

const DEFAULT_CONFIG_PATH: &str = "/etc/elm327/diag.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "elm-diag starting");

    // ── Arguments ───────────────────────────────────────────────
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut clear = false;
    for arg in std::env::args().skip(1) {
        if arg == "--clear-dtcs" {
            clear = true;
        } else {
            config_path = arg;
        }
    }

    let config = DiagConfig::from_file(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    tracing::info!(
        port = config.serial.port.as_deref().unwrap_or("auto"),
        pids = config.pids.len(),
        "config loaded"
    );

    // ── Serial link ─────────────────────────────────────────────
    let settings = config.serial.port_settings();
    let mut factory = SerialConnectionFactory::new();
    if !config.serial.candidate_ports.is_empty() {
        factory = factory.with_candidate_ports(config.serial.candidate_ports.clone());
    }
    let connection = match &config.serial.port {
        Some(port) => factory.connect(port, &settings)?,
        None => factory
            .auto_connect(&settings)
            .context("no ELM327 adapter found on any serial port")?,
    };

    // ── Adapter session ─────────────────────────────────────────
    let options = InterfaceOptions {
        read_delay: config.read_delay(),
        response_hook: Some(Box::new(|request: &str, response: &str| {
            tracing::trace!(request, response, "raw exchange");
        })),
    };
    let mut obd = ObdInterface::connect_with(connection, options).await?;

    let report = scan::run_scan(&mut obd, &config, clear).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
