//! One diagnostic pass: configured live values, trouble codes, optional clear.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use elm_obd::pids;
use elm_obd::{
    DtcCategory, DtcCode, DtcKind, ObdError, ObdInterface, ObdResult, Transport, Unavailable,
};

use crate::config::DiagConfig;

/// A live value that decoded, or `value: None` when the ECU had nothing this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PidReading {
    pub pid: u8,
    pub name: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
}

/// A configured PID the adapter refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnavailablePid {
    pub pid: u8,
    pub name: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TroubleCode {
    pub code: DtcCode,
    pub standard: Option<String>,
    pub category: Option<DtcCategory>,
}

impl From<DtcCode> for TroubleCode {
    fn from(code: DtcCode) -> Self {
        Self {
            standard: code.standard_form(),
            category: code.category(),
            code,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub readings: Vec<PidReading>,
    pub unavailable: Vec<UnavailablePid>,
    pub confirmed_dtcs: Vec<TroubleCode>,
    /// `None` when pending codes were not requested.
    pub pending_dtcs: Option<Vec<TroubleCode>>,
    /// `None` when no clear was requested.
    pub cleared: Option<bool>,
}

/// Run one scan. Unsupported PIDs are reported, not fatal; transport and
/// parse failures abort the scan.
pub async fn run_scan<T: Transport>(
    obd: &mut ObdInterface<T>,
    config: &DiagConfig,
    clear: bool,
) -> ObdResult<ScanReport> {
    let mut readings = Vec::new();
    let mut unavailable = Vec::new();

    for &pid in &config.pids {
        let Some(standard) = pids::lookup(pid) else {
            warn!(pid = %format!("{pid:#04x}"), "no decoder for PID, skipping");
            continue;
        };

        match obd.read_value(&standard.definition()).await {
            Ok(value) => readings.push(PidReading {
                pid,
                name: standard.name,
                unit: standard.unit,
                value,
            }),
            Err(ObdError::ValueNotAvailable(reason)) => unavailable.push(UnavailablePid {
                pid,
                name: standard.name,
                reason: reason.to_string(),
            }),
            Err(e) => return Err(e),
        }
    }

    let confirmed_dtcs = read_codes(obd, DtcKind::Confirmed).await?;
    let pending_dtcs = if config.read_pending_dtcs {
        Some(read_codes(obd, DtcKind::Pending).await?)
    } else {
        None
    };

    let cleared = if clear {
        Some(obd.clear_trouble_codes().await?)
    } else {
        None
    };

    info!(
        readings = readings.len(),
        unavailable = unavailable.len(),
        confirmed = confirmed_dtcs.len(),
        "scan complete"
    );

    Ok(ScanReport {
        generated_at: Utc::now(),
        readings,
        unavailable,
        confirmed_dtcs,
        pending_dtcs,
        cleared,
    })
}

async fn read_codes<T: Transport>(
    obd: &ObdInterface<T>,
    kind: DtcKind,
) -> ObdResult<Vec<TroubleCode>> {
    match obd.read_trouble_codes(kind).await {
        Ok(codes) => Ok(codes.into_iter().map(TroubleCode::from).collect()),
        Err(ObdError::ValueNotAvailable(Unavailable::NoData { .. })) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
