//! Outbound bridge events.
//!
//! The [`BridgeService`](super::service::BridgeService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count them in a test,
//! forward them to a diagnostics channel.

use crate::app::toggle::{Edge, InputId};
use crate::attribute::{AttributePath, EndpointId};
use crate::error::{HardwareError, ReconcileError, RouteError, ToggleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    /// An output failed to come up.  A configure failure leaves it disabled.
    OutputFaulted(HardwareError),

    /// The service finished startup reconciliation.  `endpoints` counts the
    /// outputs in service.
    Started { endpoints: u8, inputs: u8 },

    /// An endpoint's actuator now matches its stored OnOff value.
    Reconciled { endpoint: EndpointId, on: bool },

    ReconcileFailed(ReconcileError),

    /// A routed attribute change reached the hardware.
    OutputChanged { endpoint: EndpointId, on: bool },

    RouteFailed { path: AttributePath, error: RouteError },

    /// A debounced edge was accepted from a wall switch.
    InputEdge { input: InputId, edge: Edge },

    /// A wall switch flipped its endpoint's OnOff attribute.
    Toggled {
        input: InputId,
        endpoint: EndpointId,
        on: bool,
    },

    ToggleFailed { input: InputId, error: ToggleError },
}
