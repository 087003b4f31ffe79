//! Integration tests for the wall switch → toggle → store → relay flow.

use crate::mock_hw::{MockPins, RecordingSink};

use wallswitch::adapters::attribute_store::{MemoryAttributeStore, SharedAttributeStore};
use wallswitch::app::events::BridgeEvent;
use wallswitch::app::ports::AttributeStore;
use wallswitch::app::service::BridgeService;
use wallswitch::app::toggle::{Edge, InputId};
use wallswitch::attribute::{AttrValue, AttributePath};
use wallswitch::config::{DeviceTopology, ToggleEdge};
use wallswitch::error::ToggleError;
use wallswitch::events::{EdgeNotice, EdgeQueue};
use wallswitch::pins::{BUTTON_GPIO, LIGHT_GPIO, RELAY_GPIOS, SWITCH_GPIOS};

const DEBOUNCE: u32 = 500;

struct Rig {
    svc: BridgeService,
    pins: MockPins,
    store: MemoryAttributeStore,
    sink: RecordingSink,
}

impl Rig {
    fn new(topology: &DeviceTopology) -> Self {
        let mut pins = MockPins::new();
        let mut svc = BridgeService::new(topology, &mut pins).unwrap();
        let mut store = MemoryAttributeStore::new();
        for ep in svc.endpoints().collect::<Vec<_>>() {
            store.provision(AttributePath::on_off(ep), AttrValue::Bool(false));
        }
        let mut sink = RecordingSink::new();
        svc.start(&mut pins, &store, &mut sink);
        Self {
            svc,
            pins,
            store,
            sink,
        }
    }

    /// Press and release the button on `pin` through the ISR queue, then
    /// let the poll settle anything the debounce window held back.
    fn click(&mut self, queue: &EdgeQueue, input: InputId, pin: i32, at_ms: u32) {
        self.pins.set_level(pin, false);
        queue.push(EdgeNotice::new(input, false));
        self.svc
            .drain_edges(queue, &mut self.pins, &mut self.store, at_ms, &mut self.sink);

        self.pins.set_level(pin, true);
        queue.push(EdgeNotice::new(input, true));
        self.svc.drain_edges(
            queue,
            &mut self.pins,
            &mut self.store,
            at_ms + 80,
            &mut self.sink,
        );
        self.svc.poll_inputs(
            &mut self.pins,
            &mut self.store,
            at_ms + DEBOUNCE,
            &mut self.sink,
        );
    }

    fn stored(&self, ep: u16) -> bool {
        self.store
            .get(AttributePath::on_off(ep))
            .unwrap()
            .as_bool()
            .unwrap()
    }
}

#[test]
fn click_toggles_light_and_store_together() {
    let mut rig = Rig::new(&DeviceTopology::default());
    let queue = EdgeQueue::new();

    rig.click(&queue, InputId::new(0), BUTTON_GPIO, 1_000);
    assert!(rig.stored(1));
    assert!(rig.pins.level(LIGHT_GPIO));

    rig.click(&queue, InputId::new(0), BUTTON_GPIO, 3_000);
    assert!(!rig.stored(1));
    assert!(!rig.pins.level(LIGHT_GPIO));

    assert_eq!(
        rig.sink.count(|e| matches!(e, BridgeEvent::Toggled { .. })),
        2
    );
}

#[test]
fn each_button_only_toggles_its_endpoint() {
    let mut rig = Rig::new(&DeviceTopology::four_channel());
    let queue = EdgeQueue::new();

    rig.click(&queue, InputId::new(2), SWITCH_GPIOS[2], 1_000);

    assert_eq!([rig.stored(1), rig.stored(2), rig.stored(3), rig.stored(4)], [
        false, false, true, false
    ]);
    assert!(rig.pins.level(RELAY_GPIOS[2]));
    assert!(!rig.pins.level(RELAY_GPIOS[0]));
    assert!(!rig.pins.level(RELAY_GPIOS[1]));
    assert!(!rig.pins.level(RELAY_GPIOS[3]));
}

#[test]
fn contact_bounce_produces_a_single_toggle() {
    let mut rig = Rig::new(&DeviceTopology::default());
    let queue = EdgeQueue::new();
    let input = InputId::new(0);

    // Bouncy press: level chatters for a few ms, ISR fires on every edge.
    for (t, level) in [(1_000, false), (1_002, true), (1_004, false), (1_007, true), (1_009, false)] {
        rig.pins.set_level(BUTTON_GPIO, level);
        queue.push(EdgeNotice::new(input, level));
        rig.svc
            .drain_edges(&queue, &mut rig.pins, &mut rig.store, t, &mut rig.sink);
    }
    // Bouncy release.
    for (t, level) in [(1_200, true), (1_203, false), (1_205, true)] {
        rig.pins.set_level(BUTTON_GPIO, level);
        queue.push(EdgeNotice::new(input, level));
        rig.svc
            .drain_edges(&queue, &mut rig.pins, &mut rig.store, t, &mut rig.sink);
    }
    for t in (1_300..3_000).step_by(10) {
        rig.svc
            .poll_inputs(&mut rig.pins, &mut rig.store, t, &mut rig.sink);
    }

    assert!(rig.stored(1));
    assert_eq!(
        rig.sink.count(|e| matches!(e, BridgeEvent::Toggled { .. })),
        1
    );
}

#[test]
fn quick_tap_between_loop_ticks_toggles_once() {
    let mut rig = Rig::new(&DeviceTopology::four_channel());
    let queue = EdgeQueue::new();
    let input = InputId::new(1);

    // Press and release both fire before the loop drains; by then the pin
    // reads released again.
    queue.push(EdgeNotice::new(input, false));
    queue.push(EdgeNotice::new(input, true));
    rig.svc
        .drain_edges(&queue, &mut rig.pins, &mut rig.store, 1_000, &mut rig.sink);
    for t in (1_010..4_000).step_by(10) {
        rig.svc
            .poll_inputs(&mut rig.pins, &mut rig.store, t, &mut rig.sink);
    }

    assert!(rig.stored(2));
    assert!(rig.pins.level(RELAY_GPIOS[1]));
    assert_eq!(
        rig.sink.count(|e| matches!(e, BridgeEvent::Toggled { .. })),
        1
    );
}

#[test]
fn both_edges_mode_toggles_twice_per_click() {
    let mut topology = DeviceTopology::default();
    topology.toggle_edge = ToggleEdge::Both;
    let mut rig = Rig::new(&topology);
    let queue = EdgeQueue::new();

    rig.click(&queue, InputId::new(0), BUTTON_GPIO, 1_000);

    assert!(!rig.stored(1), "press and release cancel out");
    assert_eq!(
        rig.sink.count(|e| matches!(e, BridgeEvent::Toggled { .. })),
        2
    );
    assert_eq!(rig.pins.writes_to(LIGHT_GPIO).last(), Some(&false));
}

#[test]
fn press_mode_acts_on_button_down() {
    let mut topology = DeviceTopology::default();
    topology.toggle_edge = ToggleEdge::Press;
    let mut rig = Rig::new(&topology);
    let queue = EdgeQueue::new();

    rig.pins.set_level(BUTTON_GPIO, false);
    queue.push(EdgeNotice::new(InputId::new(0), false));
    rig.svc
        .drain_edges(&queue, &mut rig.pins, &mut rig.store, 1_000, &mut rig.sink);

    assert!(rig.stored(1));
    assert!(rig.pins.level(LIGHT_GPIO));
}

#[test]
fn toggle_without_attribute_is_an_error_and_no_hardware_change() {
    let mut pins = MockPins::new();
    let mut svc = BridgeService::new(&DeviceTopology::default(), &mut pins).unwrap();
    let mut store = MemoryAttributeStore::new();
    let mut sink = RecordingSink::new();
    pins.clear_calls();

    svc.handle_edge(&mut pins, &mut store, InputId::new(0), Edge::Release, &mut sink);

    assert_eq!(pins.write_count(), 0);
    assert!(sink.events.contains(&BridgeEvent::ToggleFailed {
        input: InputId::new(0),
        error: ToggleError::AttributeNotFound(1),
    }));
}

#[test]
fn controller_and_button_share_one_store() {
    let mut pins = MockPins::new();
    let mut svc = BridgeService::new(&DeviceTopology::default(), &mut pins).unwrap();
    let mut base = MemoryAttributeStore::new();
    base.provision(AttributePath::on_off(1), AttrValue::Bool(false));
    let mut store = SharedAttributeStore::new(base);
    let mut controller = store.clone();
    let mut sink = RecordingSink::new();
    svc.start(&mut pins, &store, &mut sink);

    controller
        .set(AttributePath::on_off(1), AttrValue::Bool(true))
        .unwrap();
    svc.handle_edge(&mut pins, &mut store, InputId::new(0), Edge::Release, &mut sink);

    // The toggle reads the controller's value; both notifications reach the relay in order.
    assert_eq!(pins.writes_to(LIGHT_GPIO), [false, false, true, false]);
    assert_eq!(
        store.get(AttributePath::on_off(1)),
        Ok(AttrValue::Bool(false))
    );
    assert_eq!(svc.commanded(1), Some(false));
}
