//! Application core: pure domain logic, zero I/O.
//!
//! The attribute-to-GPIO rules live here: actuator control, endpoint
//! routing, startup reconciliation and wall-switch toggling.  All
//! interaction with hardware and the attribute store happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod actuator;
pub mod events;
pub mod ports;
pub mod reconcile;
pub mod router;
pub mod service;
pub mod toggle;
