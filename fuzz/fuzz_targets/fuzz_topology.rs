//! Fuzz target: topology decoding
//!
//! Feeds arbitrary bytes to both provisioning decoders (postcard blob as
//! read from NVS, JSON text) and checks that:
//! - decoding never panics
//! - anything `from_json` accepts passes `validate`
//! - a valid topology either brings up a service or fails with an error
//!
//! cargo fuzz run fuzz_topology

#![no_main]

use libfuzzer_sys::fuzz_target;
use wallswitch::adapters::gpio::GpioAdapter;
use wallswitch::app::service::BridgeService;
use wallswitch::config::DeviceTopology;

fuzz_target!(|data: &[u8]| {
    if let Ok(t) = postcard::from_bytes::<DeviceTopology>(data) {
        if t.validate().is_ok() {
            let mut pins = GpioAdapter::new();
            let _ = BridgeService::new(&t, &mut pins);
        }
    }

    if let Ok(text) = core::str::from_utf8(data) {
        if let Ok(t) = DeviceTopology::from_json(text) {
            assert!(t.validate().is_ok(), "from_json returned an invalid topology");
            let mut pins = GpioAdapter::new();
            let _ = BridgeService::new(&t, &mut pins);
        }
    }
});
