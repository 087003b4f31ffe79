//! Fuzz target: wall switch and controller interleaving
//!
//! Each input byte is one step on a four-channel device: a button level
//! change through the ISR queue, a controller write, or a time advance.
//! After every step the outputs must equal the stored OnOff values.
//!
//! cargo fuzz run fuzz_switch_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use wallswitch::adapters::attribute_store::MemoryAttributeStore;
use wallswitch::adapters::gpio::GpioAdapter;
use wallswitch::app::events::BridgeEvent;
use wallswitch::app::ports::{AttributeStore, EventSink};
use wallswitch::app::service::BridgeService;
use wallswitch::app::toggle::InputId;
use wallswitch::attribute::{AttrValue, AttributePath};
use wallswitch::config::DeviceTopology;
use wallswitch::events::{EdgeNotice, EdgeQueue};
use wallswitch::pins::SWITCH_GPIOS;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &BridgeEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let topology = DeviceTopology::four_channel();
    let mut pins = GpioAdapter::new();
    let Ok(mut svc) = BridgeService::new(&topology, &mut pins) else {
        return;
    };
    let mut store = MemoryAttributeStore::new();
    for ep in 1..=4 {
        store.provision(AttributePath::on_off(ep), AttrValue::Bool(false));
    }
    svc.start(&mut pins, &store, &mut Discard);

    let queue = EdgeQueue::new();
    let mut now: u32 = 0;

    for &b in data {
        let ch = usize::from(b & 0x03);
        match b >> 6 {
            0 => {
                let level = b & 0x04 != 0;
                pins.set_input_level(SWITCH_GPIOS[ch], level);
                queue.push(EdgeNotice::new(InputId::new(ch as u8), level));
                svc.drain_edges(&queue, &mut pins, &mut store, now, &mut Discard);
            }
            1 => {
                let ep = ch as u16 + 1;
                let _ = store.set(AttributePath::on_off(ep), AttrValue::Bool(b & 0x04 != 0));
                svc.process_pending(&mut pins, &mut store, &mut Discard);
            }
            _ => {
                now = now.wrapping_add(u32::from(b & 0x3F) * 20);
                svc.poll_inputs(&mut pins, &mut store, now, &mut Discard);
            }
        }

        for ep in 1..=4u16 {
            let stored = store.get(AttributePath::on_off(ep)).ok().and_then(AttrValue::as_bool);
            assert_eq!(svc.output_level(&mut pins, ep), stored, "endpoint {ep} diverged");
        }
    }
});
