//! Bridge service, the hexagonal core.
//!
//! [`BridgeService`] owns the endpoint router (and through it the actuator
//! bank), the toggle handler and the wall-switch debouncers.  Pin driver,
//! attribute store and event sink are injected at each call site, so the
//! whole service runs against mock adapters on the host.
//!
//! ```text
//!  EdgeQueue ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                │        BridgeService        │
//!  Store ◀─────▶ │ Toggle · Router · Actuators │ ──▶ PinDriver
//!                └────────────────────────────┘
//! ```
//!
//! Every output change after startup follows one path: a store write
//! produces a change notification, [`BridgeService::process_pending`]
//! drains it, and the router drives the pin.

use heapless::Vec;
use log::{info, warn};

use crate::app::reconcile::{self, ReconcileReport};
use crate::app::router::EndpointRouter;
use crate::app::toggle::{Edge, InputId, ToggleHandler};
use crate::attribute::{AttributeChange, EndpointId};
use crate::config::{DeviceTopology, MAX_ENDPOINTS};
use crate::drivers::button::WallSwitch;
use crate::error::Result;
use crate::events::{EdgeNotice, EdgeQueue};

use super::events::BridgeEvent;
use super::ports::{AttributeStore, EventSink, PinDriver};

pub struct BridgeService {
    router: EndpointRouter,
    toggle: ToggleHandler,
    /// Indexed by [`InputId`]; `None` for inputs whose pin failed to init.
    switches: Vec<Option<WallSwitch>, MAX_ENDPOINTS>,
}

impl BridgeService {
    /// Validate `topology`, bring up every actuator (parked off) and every
    /// wall switch.
    ///
    /// Only an invalid topology aborts construction.  An actuator whose pin
    /// cannot be configured stays routed but disabled, and is reported as
    /// [`BridgeEvent::OutputFaulted`] by [`start`](Self::start).  A wall
    /// switch that fails to init is logged and left disabled; its endpoint
    /// stays controllable through the store.
    pub fn new(topology: &DeviceTopology, pins: &mut impl PinDriver) -> Result<Self> {
        let router = EndpointRouter::init(topology, pins)?;
        let toggle = ToggleHandler::new(topology)?;

        let mut switches = Vec::new();
        let inputs = topology.endpoints.iter().filter_map(|e| e.input.as_ref());
        for (binding, cfg) in toggle.bindings().zip(inputs) {
            let sw = match WallSwitch::init(pins, binding.input, cfg, topology.debounce_ms) {
                Ok(sw) => Some(sw),
                Err(e) => {
                    warn!(
                        "Failed to init input {} on GPIO {} (endpoint {}): {}",
                        binding.input, cfg.pin, binding.endpoint, e
                    );
                    None
                }
            };
            let _ = switches.push(sw);
        }

        Ok(Self {
            router,
            toggle,
            switches,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Reconcile every endpoint with the store.  Call once, after the
    /// store holds its persisted/default values and before the first
    /// [`process_pending`](Self::process_pending).
    pub fn start(
        &mut self,
        pins: &mut impl PinDriver,
        store: &impl AttributeStore,
        sink: &mut impl EventSink,
    ) -> ReconcileReport {
        for fault in self.router.actuators().faults() {
            sink.emit(&BridgeEvent::OutputFaulted(*fault));
        }

        let report = reconcile::reconcile_all(&mut self.router, pins, store);

        for (endpoint, result) in &report.results {
            match result {
                Ok(on) => sink.emit(&BridgeEvent::Reconciled {
                    endpoint: *endpoint,
                    on: *on,
                }),
                Err(e) => sink.emit(&BridgeEvent::ReconcileFailed(*e)),
            }
        }

        sink.emit(&BridgeEvent::Started {
            endpoints: self.router.actuators().enabled() as u8,
            inputs: self.switches.iter().flatten().count() as u8,
        });
        info!("BridgeService started");
        report
    }

    // ── Attribute changes ─────────────────────────────────────

    /// Entry point for a store change notification.  Changes to paths
    /// without a route are dropped silently.
    pub fn handle_attribute_change(
        &mut self,
        pins: &mut impl PinDriver,
        change: AttributeChange,
        sink: &mut impl EventSink,
    ) {
        let routed = self.router.resolve(change.path).is_some();
        match self.router.route(pins, change.path, change.value) {
            Ok(()) if routed => {
                if let Some(on) = change.value.as_bool() {
                    sink.emit(&BridgeEvent::OutputChanged {
                        endpoint: change.path.endpoint,
                        on,
                    });
                }
            }
            Ok(()) => {}
            Err(error) => sink.emit(&BridgeEvent::RouteFailed {
                path: change.path,
                error,
            }),
        }
    }

    /// Drain every pending store notification through the router.
    /// Returns the number of notifications handled.
    pub fn process_pending(
        &mut self,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Some(change) = store.take_change() {
            self.handle_attribute_change(pins, change, sink);
            handled += 1;
        }
        handled
    }

    // ── Input edges ───────────────────────────────────────────

    /// Handle an already-debounced edge from `input`.
    ///
    /// The toggle is written to the store and the resulting notification is
    /// processed before returning.
    pub fn handle_edge(
        &mut self,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        input: InputId,
        edge: Edge,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&BridgeEvent::InputEdge { input, edge });

        match self.toggle.on_edge(input, edge, store) {
            Ok(Some(on)) => {
                if let Some(endpoint) = self.toggle.endpoint_for(input) {
                    sink.emit(&BridgeEvent::Toggled {
                        input,
                        endpoint,
                        on,
                    });
                }
            }
            Ok(None) => {}
            Err(error) => sink.emit(&BridgeEvent::ToggleFailed { input, error }),
        }

        self.process_pending(pins, store, sink);
    }

    /// Sample `input`'s pin now and run the level through its debouncer.
    /// Returns the accepted edge, if any.
    pub fn handle_raw_edge(
        &mut self,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        input: InputId,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Option<Edge> {
        let pin = self.switches.get(input.index())?.as_ref()?.pin();
        let level = pins.read(pin);
        self.handle_level(pins, store, input, level, now_ms, sink)
    }

    /// Run an already-sampled raw `level` for `input` through its
    /// debouncer.  Returns the accepted edge, if any.
    pub fn handle_level(
        &mut self,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        input: InputId,
        level: bool,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Option<Edge> {
        let sw = self.switches.get_mut(input.index())?.as_mut()?;
        let edge = sw.update(now_ms, level)?;
        self.handle_edge(pins, store, input, edge, sink);
        Some(edge)
    }

    /// Sample every wall switch.  Settles edges that an ISR notification
    /// could not (suppressed inside the debounce window, or dropped from a
    /// full queue).
    pub fn poll_inputs(
        &mut self,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut accepted = 0;
        for i in 0..self.switches.len() {
            let input = InputId::new(i as u8);
            if self
                .handle_raw_edge(pins, store, input, now_ms, sink)
                .is_some()
            {
                accepted += 1;
            }
        }
        accepted
    }

    /// Drain ISR notifications from `queue` through the debouncers, using
    /// the level each notification captured rather than the pin's current
    /// one.
    pub fn drain_edges(
        &mut self,
        queue: &EdgeQueue,
        pins: &mut impl PinDriver,
        store: &mut impl AttributeStore,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut accepted = 0;
        queue.drain(|EdgeNotice { input, high }| {
            if self
                .handle_level(pins, store, input, high, now_ms, sink)
                .is_some()
            {
                accepted += 1;
            }
        });
        accepted
    }

    // ── Queries ───────────────────────────────────────────────

    /// Last successfully commanded state of `endpoint`'s actuator.
    pub fn commanded(&self, endpoint: EndpointId) -> Option<bool> {
        let id = self.router.actuator_for(endpoint)?;
        self.router.actuators().commanded(id)
    }

    /// Physical output state of `endpoint`, read back from the pin.
    pub fn output_level(&self, pins: &mut impl PinDriver, endpoint: EndpointId) -> Option<bool> {
        let id = self.router.actuator_for(endpoint)?;
        self.router.actuators().output_state(pins, id)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.router.endpoints()
    }

    pub fn router(&self) -> &EndpointRouter {
        &self.router
    }

    pub fn toggle_handler(&self) -> &ToggleHandler {
        &self.toggle
    }

    pub fn switch(&self, input: InputId) -> Option<&WallSwitch> {
        self.switches.get(input.index())?.as_ref()
    }

    /// GPIOs of the wall switches that came up, with their input ids.
    pub fn input_pins(&self) -> impl Iterator<Item = (InputId, i32)> + '_ {
        self.switches.iter().flatten().map(|s| (s.input(), s.pin()))
    }
}
