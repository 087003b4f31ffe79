//! Mock adapters for integration tests.
//!
//! Records every pin driver call so tests can assert on the full command
//! history without touching real GPIO registers.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use wallswitch::app::events::BridgeEvent;
use wallswitch::app::ports::{
    ConfigError, ConfigPort, EventSink, PinDirection, PinDriver, PinError, PinId, PinMode,
};
use wallswitch::config::DeviceTopology;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinCall {
    Configure { pin: PinId, mode: PinMode },
    Write { pin: PinId, high: bool },
}

// ── MockPins ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPins {
    pub calls: Vec<PinCall>,
    levels: HashMap<PinId, bool>,
    failing: HashSet<PinId>,
    unconfigurable: HashSet<PinId>,
}

#[allow(dead_code)]
impl MockPins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `pin` fail with `ESP_FAIL`.
    pub fn fail_writes(&mut self, pin: PinId) {
        self.failing.insert(pin);
    }

    /// Make `configure` on `pin` fail with `ESP_ERR_INVALID_ARG`.
    pub fn reject_configure(&mut self, pin: PinId) {
        self.unconfigurable.insert(pin);
    }

    pub fn heal(&mut self, pin: PinId) {
        self.failing.remove(&pin);
    }

    /// Drive an input pin from outside (button wiring).
    pub fn set_level(&mut self, pin: PinId, high: bool) {
        self.levels.insert(pin, high);
    }

    pub fn level(&self, pin: PinId) -> bool {
        self.levels.get(&pin).copied().unwrap_or(false)
    }

    pub fn writes_to(&self, pin: PinId) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                PinCall::Write { pin: p, high } if p == pin => Some(high),
                _ => None,
            })
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PinCall::Write { .. }))
            .count()
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.calls.iter().rev().find_map(|c| match *c {
            PinCall::Configure { pin: p, mode } if p == pin => Some(mode),
            _ => None,
        })
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl PinDriver for MockPins {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        self.calls.push(PinCall::Configure { pin, mode });
        if self.unconfigurable.contains(&pin) {
            return Err(PinError::INVALID_ARG);
        }
        if mode.direction == PinDirection::Input && mode.pull_up {
            self.levels.entry(pin).or_insert(true);
        }
        Ok(())
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), PinError> {
        self.calls.push(PinCall::Write { pin, high });
        if self.failing.contains(&pin) {
            return Err(PinError::FAIL);
        }
        self.levels.insert(pin, high);
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> bool {
        self.level(pin)
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    stored: RefCell<Option<DeviceTopology>>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<DeviceTopology, ConfigError> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, topology: &DeviceTopology) -> Result<(), ConfigError> {
        topology.validate()?;
        *self.stored.borrow_mut() = Some(topology.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BridgeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&BridgeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(*event);
    }
}
