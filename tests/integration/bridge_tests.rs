//! Integration tests for the store → router → actuator pipeline.
//!
//! Drive attribute writes through a real `MemoryAttributeStore` and assert
//! on the recorded pin history.

use crate::mock_hw::{MockPins, PinCall, RecordingSink};

use wallswitch::adapters::attribute_store::MemoryAttributeStore;
use wallswitch::app::events::BridgeEvent;
use wallswitch::app::ports::{AttributeStore, PinDirection, PinError};
use wallswitch::app::service::BridgeService;
use wallswitch::attribute::{AttrValue, AttributeChange, AttributePath, ON_OFF_CLUSTER};
use wallswitch::config::{DeviceTopology, Polarity};
use wallswitch::error::{ReconcileError, RouteError};
use wallswitch::pins::{LIGHT_GPIO, RELAY_GPIOS};

fn provisioned(states: &[(u16, bool)]) -> MemoryAttributeStore {
    let mut store = MemoryAttributeStore::new();
    for &(ep, on) in states {
        store.provision(AttributePath::on_off(ep), AttrValue::Bool(on));
    }
    store
}

fn four_channel() -> (BridgeService, MockPins, MemoryAttributeStore, RecordingSink) {
    let mut pins = MockPins::new();
    let svc = BridgeService::new(&DeviceTopology::four_channel(), &mut pins).unwrap();
    let store = provisioned(&[(1, false), (2, false), (3, false), (4, false)]);
    (svc, pins, store, RecordingSink::new())
}

// ── Initialisation ────────────────────────────────────────────

#[test]
fn init_parks_every_output_off_exactly_once() {
    let mut pins = MockPins::new();
    let mut topology = DeviceTopology::four_channel();
    topology.endpoints[3].actuator.polarity = Polarity::ActiveLow;
    let _svc = BridgeService::new(&topology, &mut pins).unwrap();

    for (i, &relay) in RELAY_GPIOS.iter().enumerate() {
        assert_eq!(pins.mode(relay).unwrap().direction, PinDirection::Output);
        let off_level = i == 3;
        assert_eq!(pins.writes_to(relay), [off_level], "relay {i}");
    }
}

#[test]
fn unconfigurable_relay_is_reported_and_the_rest_serve() {
    let mut pins = MockPins::new();
    pins.reject_configure(RELAY_GPIOS[1]);
    let mut svc = BridgeService::new(&DeviceTopology::four_channel(), &mut pins).unwrap();
    let mut store = provisioned(&[(1, false), (2, false), (3, false), (4, false)]);
    let mut sink = RecordingSink::new();

    let report = svc.start(&mut pins, &store, &mut sink);

    assert!(sink.events.iter().any(
        |e| matches!(e, BridgeEvent::OutputFaulted(hw) if hw.pin == RELAY_GPIOS[1])
    ));
    assert!(matches!(report.get(2), Some(Err(ReconcileError::HardwareFailure(_)))));
    assert!(sink
        .events
        .contains(&BridgeEvent::Started { endpoints: 3, inputs: 4 }));
    assert!(pins.writes_to(RELAY_GPIOS[1]).is_empty());

    for ep in [1u16, 3, 4] {
        store.set(AttributePath::on_off(ep), AttrValue::Bool(true)).unwrap();
    }
    store.set(AttributePath::on_off(2), AttrValue::Bool(true)).unwrap();
    svc.process_pending(&mut pins, &mut store, &mut sink);

    for (i, &relay) in RELAY_GPIOS.iter().enumerate() {
        assert_eq!(pins.level(relay), i != 1, "relay {i}");
    }
    assert!(sink.events.iter().any(|e| matches!(
        e,
        BridgeEvent::RouteFailed { path, error: RouteError::HardwareFailure(_) }
            if *path == AttributePath::on_off(2)
    )));
}

// ── Startup reconcile ─────────────────────────────────────────

#[test]
fn reconcile_matches_hardware_to_store() {
    let mut pins = MockPins::new();
    let mut svc = BridgeService::new(&DeviceTopology::four_channel(), &mut pins).unwrap();
    let store = provisioned(&[(1, true), (2, false), (3, true), (4, false)]);
    let mut sink = RecordingSink::new();

    let report = svc.start(&mut pins, &store, &mut sink);

    assert!(report.is_clean());
    for ep in 1..=4u16 {
        let stored = store.get(AttributePath::on_off(ep)).unwrap().as_bool();
        assert_eq!(svc.output_level(&mut pins, ep), stored, "endpoint {ep}");
        assert_eq!(svc.commanded(ep), stored);
    }
}

#[test]
fn reconcile_reports_missing_attribute_and_hardware_fault() {
    let mut pins = MockPins::new();
    let mut svc = BridgeService::new(&DeviceTopology::four_channel(), &mut pins).unwrap();
    let store = provisioned(&[(1, true), (2, true), (4, true)]);
    pins.fail_writes(RELAY_GPIOS[1]);
    let mut sink = RecordingSink::new();

    let report = svc.start(&mut pins, &store, &mut sink);

    assert_eq!(report.get(3), Some(&Err(ReconcileError::AttributeNotFound(3))));
    match report.get(2) {
        Some(Err(ReconcileError::HardwareFailure(hw))) => {
            assert_eq!(hw.pin, RELAY_GPIOS[1]);
            assert_eq!(hw.requested(), Some(true));
            assert_eq!(hw.cause, PinError::FAIL);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(svc.output_level(&mut pins, 1), Some(true));
    assert_eq!(svc.output_level(&mut pins, 4), Some(true));
    assert_eq!(
        sink.count(|e| matches!(e, BridgeEvent::ReconcileFailed(_))),
        2
    );
}

// ── Routing ───────────────────────────────────────────────────

#[test]
fn controller_write_reaches_only_its_relay() {
    let (mut svc, mut pins, mut store, mut sink) = four_channel();
    svc.start(&mut pins, &store, &mut sink);
    pins.clear_calls();

    store.set(AttributePath::on_off(3), AttrValue::Bool(true)).unwrap();
    svc.process_pending(&mut pins, &mut store, &mut sink);

    assert_eq!(
        pins.calls,
        [PinCall::Write {
            pin: RELAY_GPIOS[2],
            high: true
        }]
    );
    assert!(sink.events.contains(&BridgeEvent::OutputChanged { endpoint: 3, on: true }));
}

#[test]
fn unrelated_attribute_changes_touch_nothing() {
    let (mut svc, mut pins, _store, mut sink) = four_channel();
    pins.clear_calls();

    let unrelated = [
        AttributeChange::new(AttributePath::on_off(7), AttrValue::Bool(true)),
        AttributeChange::new(AttributePath::new(1, ON_OFF_CLUSTER, 0x4003), AttrValue::Uint(1)),
        AttributeChange::new(AttributePath::new(2, 0x0008, 0x0000), AttrValue::Uint(254)),
        AttributeChange::new(AttributePath::new(0, 0x0028, 0x0001), AttrValue::Null),
    ];
    for change in unrelated {
        svc.handle_attribute_change(&mut pins, change, &mut sink);
    }

    assert!(pins.calls.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn redundant_write_reasserts_level() {
    let (mut svc, mut pins, mut store, mut sink) = four_channel();
    pins.clear_calls();

    for _ in 0..2 {
        store.set(AttributePath::on_off(1), AttrValue::Bool(true)).unwrap();
        svc.process_pending(&mut pins, &mut store, &mut sink);
    }

    assert_eq!(pins.writes_to(RELAY_GPIOS[0]), [true, true]);
    assert_eq!(svc.commanded(1), Some(true));
    assert!(pins.level(RELAY_GPIOS[0]));
}

#[test]
fn hardware_failure_is_reported_and_others_keep_working() {
    let (mut svc, mut pins, mut store, mut sink) = four_channel();
    pins.fail_writes(RELAY_GPIOS[0]);

    store.set(AttributePath::on_off(1), AttrValue::Bool(true)).unwrap();
    store.set(AttributePath::on_off(2), AttrValue::Bool(true)).unwrap();
    assert_eq!(svc.process_pending(&mut pins, &mut store, &mut sink), 2);

    assert_eq!(svc.commanded(1), Some(false), "failed write keeps old state");
    assert_eq!(svc.commanded(2), Some(true));
    let failure = sink.events.iter().find_map(|e| match e {
        BridgeEvent::RouteFailed { path, error } => Some((*path, *error)),
        _ => None,
    });
    match failure {
        Some((path, RouteError::HardwareFailure(hw))) => {
            assert_eq!(path, AttributePath::on_off(1));
            assert_eq!(hw.pin, RELAY_GPIOS[0]);
            assert_eq!(hw.requested(), Some(true));
        }
        other => panic!("unexpected {other:?}"),
    }

    // Once the driver recovers the next write goes through.
    pins.heal(RELAY_GPIOS[0]);
    store.set(AttributePath::on_off(1), AttrValue::Bool(true)).unwrap();
    svc.process_pending(&mut pins, &mut store, &mut sink);
    assert_eq!(svc.output_level(&mut pins, 1), Some(true));
}

#[test]
fn active_low_relay_inverts_level() {
    let mut topology = DeviceTopology::default();
    topology.endpoints[0].actuator.polarity = Polarity::ActiveLow;
    let mut pins = MockPins::new();
    let mut svc = BridgeService::new(&topology, &mut pins).unwrap();
    let mut store = provisioned(&[(1, false)]);
    let mut sink = RecordingSink::new();

    assert!(pins.level(LIGHT_GPIO), "off is high on an active-low relay");
    store.set(AttributePath::on_off(1), AttrValue::Bool(true)).unwrap();
    svc.process_pending(&mut pins, &mut store, &mut sink);
    assert!(!pins.level(LIGHT_GPIO));
    assert_eq!(svc.output_level(&mut pins, 1), Some(true));
}
