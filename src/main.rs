//! Wallswitch firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioAdapter    MemoryAttributeStore   LogEventSink  NvsAdapter │
//! │  (PinDriver)    (AttributeStore)       (EventSink)   (Config)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            BridgeService (pure logic)                  │    │
//! │  │  Router · Actuators · Reconcile · Toggle               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GPIO ISRs ──▶ INPUT_EDGES ──▶ main loop                       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use wallswitch::adapters::attribute_store::MemoryAttributeStore;
use wallswitch::adapters::gpio::GpioAdapter;
use wallswitch::adapters::log_sink::LogEventSink;
use wallswitch::adapters::nvs::NvsAdapter;
use wallswitch::adapters::time::Esp32TimeAdapter;
use wallswitch::app::ports::ConfigPort;
use wallswitch::app::service::BridgeService;
use wallswitch::attribute::{AttrValue, AttributePath};
use wallswitch::config::DeviceTopology;
use wallswitch::drivers::hw_init;
use wallswitch::events::INPUT_EDGES;

/// Main loop period.  Well below any sensible debounce interval.
const LOOP_TICK: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Wallswitch v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load topology from NVS (or defaults) ───────────────
    let topology = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(t) => t,
        Err(e) => {
            warn!("Topology load failed ({}), using defaults", e);
            DeviceTopology::default()
        }
    };

    // ── 3. Bring up outputs and wall switches ─────────────────
    let mut gpio = GpioAdapter::new();
    let mut service = match BridgeService::new(&topology, &mut gpio) {
        Ok(service) => service,
        Err(e) => {
            error!("Topology rejected ({}), retrying with defaults", e);
            BridgeService::new(&DeviceTopology::default(), &mut gpio)?
        }
    };

    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, wall switches fall back to polling", e);
    } else {
        for (input, pin) in service.input_pins() {
            if let Err(e) = hw_init::register_input_isr(pin, input) {
                warn!("input {}: {}, polling only", input, e);
            }
        }
    }

    // ── 4. Attribute store: every endpoint starts off ─────────
    let mut store = MemoryAttributeStore::new();
    for ep in service.endpoints() {
        store.provision(AttributePath::on_off(ep), AttrValue::Bool(false));
    }

    // ── 5. Startup reconcile ──────────────────────────────────
    let mut sink = LogEventSink::new();
    let report = service.start(&mut gpio, &store, &mut sink);
    if !report.is_clean() {
        warn!("{} endpoint(s) failed to reconcile", report.failures().count());
    }

    let clock = Esp32TimeAdapter::new();
    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        service.drain_edges(&INPUT_EDGES, &mut gpio, &mut store, now_ms, &mut sink);
        service.poll_inputs(&mut gpio, &mut store, now_ms, &mut sink);
        service.process_pending(&mut gpio, &mut store, &mut sink);

        std::thread::sleep(LOOP_TICK);
    }
}
