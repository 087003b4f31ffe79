//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per
//! [`BridgeEvent`] to the `log` facade (the ESP-IDF logger on target, UART /
//! USB-CDC in production).  Failures go out at `warn!` so they survive a
//! quieter log level.

use log::{info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::OutputFaulted(e) => {
                warn!("OUTPUT | fault: {}", e);
            }
            BridgeEvent::Started { endpoints, inputs } => {
                info!("START | outputs={} inputs={}", endpoints, inputs);
            }
            BridgeEvent::Reconciled { endpoint, on } => {
                info!("RECONCILE | ep={} on={}", endpoint, on);
            }
            BridgeEvent::ReconcileFailed(e) => {
                warn!("RECONCILE | failed: {}", e);
            }
            BridgeEvent::OutputChanged { endpoint, on } => {
                info!("OUTPUT | ep={} on={}", endpoint, on);
            }
            BridgeEvent::RouteFailed { path, error } => {
                warn!("OUTPUT | {} failed: {}", path, error);
            }
            BridgeEvent::InputEdge { input, edge } => {
                info!("INPUT | {} {:?}", input, edge);
            }
            BridgeEvent::Toggled {
                input,
                endpoint,
                on,
            } => {
                info!("TOGGLE | {} -> ep={} on={}", input, endpoint, on);
            }
            BridgeEvent::ToggleFailed { input, error } => {
                warn!("TOGGLE | {} failed: {}", input, error);
            }
        }
    }
}
