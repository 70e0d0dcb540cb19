//! E2E tests for reading and clearing trouble codes over the serial line.

mod helpers;

use std::collections::BTreeSet;

use elm_obd::{DtcCode, DtcKind, ObdError, Unavailable};
use helpers::{AdapterScript, TestHarness};

fn codes(list: &[&str]) -> BTreeSet<DtcCode> {
    list.iter().map(|c| DtcCode::from(*c)).collect()
}

#[tokio::test]
async fn e2e_confirmed_codes() {
    let script = AdapterScript::new().reply("03", "43 01 33 00 00 00 00");
    let h = TestHarness::connect(script).await.unwrap();

    let found = h.obd.read_trouble_codes(DtcKind::Confirmed).await.unwrap();
    assert_eq!(found, codes(&["0133"]));
}

/// Codes from several ECUs are merged and deduplicated.
#[tokio::test]
async fn e2e_codes_from_two_ecus_are_merged() {
    let script = AdapterScript::new().reply("03", "43 01 33 02 14\r43 02 14 C1 00");
    let h = TestHarness::connect(script).await.unwrap();

    let found = h.obd.read_trouble_codes(DtcKind::Confirmed).await.unwrap();

    assert_eq!(found, codes(&["0133", "0214", "C100"]));
    let standard: Vec<_> = found.iter().filter_map(DtcCode::standard_form).collect();
    assert_eq!(standard, vec!["P0133", "P0214", "U0100"]);
}

/// Pending codes answer with their own ack prefix; confirmed-prefixed
/// frames are not mixed in.
#[tokio::test]
async fn e2e_pending_codes() {
    let script = AdapterScript::new().reply("07", "47 03 00\r43 01 33");
    let h = TestHarness::connect(script).await.unwrap();

    let found = h.obd.read_trouble_codes(DtcKind::Pending).await.unwrap();
    assert_eq!(found, codes(&["0300"]));
}

#[tokio::test]
async fn e2e_no_codes_stored() {
    let script = AdapterScript::new().reply("03", "43 00 00 00 00 00 00");
    let h = TestHarness::connect(script).await.unwrap();

    assert!(h.obd.read_trouble_codes(DtcKind::Confirmed).await.unwrap().is_empty());
}

#[tokio::test]
async fn e2e_no_data_for_codes() {
    let script = AdapterScript::new().reply("03", "NO DATA");
    let h = TestHarness::connect(script).await.unwrap();

    let err = h.obd.read_trouble_codes(DtcKind::Confirmed).await.unwrap_err();
    assert!(matches!(
        err,
        ObdError::ValueNotAvailable(Unavailable::NoData { request: "03" })
    ));
}

#[tokio::test]
async fn e2e_clear_codes() {
    let h = TestHarness::connect(AdapterScript::new().reply("04", "44"))
        .await
        .unwrap();

    assert!(h.obd.clear_trouble_codes().await.unwrap());
    assert_eq!(h.requests.obd(), vec!["04"]);
}

/// An ECU refusing the clear is reported, not raised.
#[tokio::test]
async fn e2e_clear_refused() {
    let h = TestHarness::connect(AdapterScript::new().reply("04", "7F 04 22"))
        .await
        .unwrap();

    assert!(!h.obd.clear_trouble_codes().await.unwrap());
}
