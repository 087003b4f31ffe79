//! Error types for the synchronization core.
//!
//! One small `Copy` enum per operation family, all convertible into the
//! crate-wide [`Error`].  None of them is fatal: callers log, report, and
//! keep serving the other endpoints.

use core::fmt;

use crate::app::actuator::ActuatorId;
use crate::app::ports::{ConfigError, PinError, PinId, StoreError};
use crate::app::toggle::InputId;
use crate::attribute::{AttributePath, EndpointId};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Hardware(HardwareError),
    Route(RouteError),
    Reconcile(ReconcileError),
    Toggle(ToggleError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Route(e) => write!(f, "route: {e}"),
            Self::Reconcile(e) => write!(f, "reconcile: {e}"),
            Self::Toggle(e) => write!(f, "toggle: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// What the driver was asked to do when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareOp {
    /// Pin reset / direction setup during init.
    Configure,
    /// Level write for a commanded state.
    Write { on: bool },
}

/// A pin driver call failed for an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareError {
    pub actuator: ActuatorId,
    pub pin: PinId,
    pub op: HardwareOp,
    pub cause: PinError,
}

impl HardwareError {
    /// Commanded state of the failed write, if it was a write.
    pub const fn requested(&self) -> Option<bool> {
        match self.op {
            HardwareOp::Write { on } => Some(on),
            HardwareOp::Configure => None,
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            HardwareOp::Configure => write!(
                f,
                "actuator {} (GPIO {}) configure failed: {}",
                self.actuator, self.pin, self.cause
            ),
            HardwareOp::Write { on } => write!(
                f,
                "actuator {} (GPIO {}) set {} failed: {}",
                self.actuator,
                self.pin,
                if on { "on" } else { "off" },
                self.cause
            ),
        }
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Route errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// The bound actuator rejected the write.
    HardwareFailure(HardwareError),
    /// A routed attribute carried a non-boolean payload.
    InvalidValue(AttributePath),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareFailure(e) => write!(f, "{e}"),
            Self::InvalidValue(path) => write!(f, "{path}: payload is not boolean"),
        }
    }
}

impl From<HardwareError> for RouteError {
    fn from(e: HardwareError) -> Self {
        Self::HardwareFailure(e)
    }
}

impl From<RouteError> for Error {
    fn from(e: RouteError) -> Self {
        Self::Route(e)
    }
}

// ---------------------------------------------------------------------------
// Reconcile errors (startup only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileError {
    /// Endpoint declared in the topology but not provisioned in the store.
    AttributeNotFound(EndpointId),
    /// Endpoint is not part of the topology.
    NotRouted(EndpointId),
    /// Stored OnOff value is not boolean.
    InvalidValue(EndpointId),
    /// The store failed for a reason other than a missing attribute.
    Store(EndpointId, StoreError),
    HardwareFailure(HardwareError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeNotFound(ep) => write!(f, "OnOff attribute not found for endpoint {ep}"),
            Self::NotRouted(ep) => write!(f, "endpoint {ep} has no actuator"),
            Self::InvalidValue(ep) => write!(f, "endpoint {ep}: OnOff value is not boolean"),
            Self::Store(ep, e) => write!(f, "endpoint {ep}: {e}"),
            Self::HardwareFailure(e) => write!(f, "{e}"),
        }
    }
}

impl From<HardwareError> for ReconcileError {
    fn from(e: HardwareError) -> Self {
        Self::HardwareFailure(e)
    }
}

impl From<ReconcileError> for Error {
    fn from(e: ReconcileError) -> Self {
        Self::Reconcile(e)
    }
}

// ---------------------------------------------------------------------------
// Toggle errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleError {
    /// No binding for this input.
    UnboundInput(InputId),
    /// Bound endpoint has no OnOff attribute in the store.
    AttributeNotFound(EndpointId),
    /// Stored OnOff value is not boolean.
    InvalidValue(EndpointId),
    /// Concurrent writers kept moving the value; gave up.
    Contended(EndpointId),
    Store(EndpointId, StoreError),
}

impl fmt::Display for ToggleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundInput(input) => write!(f, "input {input} is not bound"),
            Self::AttributeNotFound(ep) => write!(f, "OnOff attribute not found for endpoint {ep}"),
            Self::InvalidValue(ep) => write!(f, "endpoint {ep}: OnOff value is not boolean"),
            Self::Contended(ep) => write!(f, "endpoint {ep}: toggle lost to concurrent writes"),
            Self::Store(ep, e) => write!(f, "endpoint {ep}: {e}"),
        }
    }
}

impl From<ToggleError> for Error {
    fn from(e: ToggleError) -> Self {
        Self::Toggle(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
