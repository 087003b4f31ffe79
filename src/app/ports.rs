//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BridgeService (domain)
//! ```
//!
//! Driven adapters (pin driver, attribute store, event sinks, config
//! storage) implement these traits.  The
//! [`BridgeService`](super::service::BridgeService) receives them as
//! generics at each call site, so the core never owns or re-initialises a
//! collaborator.

use crate::attribute::{AttrValue, AttributeChange, AttributePath};
use crate::config::DeviceTopology;

// ───────────────────────────────────────────────────────────────
// Pin driver port (driven adapter: domain ↔ GPIO)
// ───────────────────────────────────────────────────────────────

/// GPIO number as understood by the pin driver.
pub type PinId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Direction and pull configuration for a single pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMode {
    pub direction: PinDirection,
    pub pull_up: bool,
    pub pull_down: bool,
}

impl PinMode {
    /// Push-pull output, no pulls.
    pub const OUTPUT: Self = Self {
        direction: PinDirection::Output,
        pull_up: false,
        pull_down: false,
    };

    pub const fn input(pull_up: bool, pull_down: bool) -> Self {
        Self {
            direction: PinDirection::Input,
            pull_up,
            pull_down,
        }
    }
}

/// Single-call GPIO primitive.  Holds no state the core relies on.
pub trait PinDriver {
    /// Reset `pin` and apply direction and pulls.
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError>;

    /// Drive an output pin (`true` = high).
    fn write(&mut self, pin: PinId, high: bool) -> Result<(), PinError>;

    /// Sample the pin level (`true` = high).
    fn read(&mut self, pin: PinId) -> bool;
}

/// Failure code reported by the pin driver (`esp_err_t` on ESP-IDF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError(pub i32);

impl PinError {
    /// Generic driver failure (`ESP_FAIL`).
    pub const FAIL: Self = Self(-1);
    /// Pin not valid for the requested operation (`ESP_ERR_INVALID_ARG`).
    pub const INVALID_ARG: Self = Self(0x102);

    pub const fn code(self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pin driver error {}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Attribute store port (driven adapter: domain ↔ data model)
// ───────────────────────────────────────────────────────────────

/// The attribute store holding each endpoint's commanded state.
///
/// Every successful [`set`](AttributeStore::set), whatever its origin,
/// must make a matching [`AttributeChange`] available from
/// [`take_change`](AttributeStore::take_change).  The service drains those
/// notifications through the router, which is the only path that drives
/// outputs.
pub trait AttributeStore {
    fn get(&self, path: AttributePath) -> Result<AttrValue, StoreError>;

    fn set(&mut self, path: AttributePath, value: AttrValue) -> Result<(), StoreError>;

    /// Write `new` only if the attribute still holds `expected`.
    ///
    /// Returns `Ok(false)` when the stored value moved underneath the
    /// caller.  Stores shared between contexts must override this with a
    /// single locked read-compare-write.
    fn compare_and_set(
        &mut self,
        path: AttributePath,
        expected: AttrValue,
        new: AttrValue,
    ) -> Result<bool, StoreError> {
        if self.get(path)? != expected {
            return Ok(false);
        }
        self.set(path, new)?;
        Ok(true)
    }

    /// Pop the oldest pending change notification.
    fn take_change(&mut self) -> Option<AttributeChange>;
}

/// Errors from [`AttributeStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No such attribute has been provisioned.
    NotFound,
    /// The written value's type does not match the attribute.
    TypeMismatch,
    /// The notification queue is full; the write was not applied.
    QueueFull,
    /// Backend-specific failure code.
    Backend(i32),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "attribute not found"),
            Self::TypeMismatch => write!(f, "attribute type mismatch"),
            Self::QueueFull => write!(f, "change queue full"),
            Self::Backend(code) => write!(f, "store backend error {}", code),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent topology)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the device topology.
///
/// Implementations MUST validate before persisting; an invalid topology is
/// rejected with [`ConfigError::ValidationFailed`], never repaired.
pub trait ConfigPort {
    /// Load the topology.  Returns [`DeviceTopology::default()`] if nothing
    /// is stored yet.
    fn load(&self) -> Result<DeviceTopology, ConfigError>;

    /// Validate and persist the topology.
    fn save(&self, topology: &DeviceTopology) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations and topology validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No topology found in storage (first boot).
    NotFound,
    /// Stored topology failed deserialization.
    Corrupted,
    /// A topology field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "topology not found"),
            Self::Corrupted => write!(f, "topology corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
