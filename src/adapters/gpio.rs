//! GPIO pin driver adapter.
//!
//! Implements [`PinDriver`] for the ESP32 GPIO matrix.
//!
//! - **`target_os = "espidf"`**: forwards to the raw calls in
//!   [`hw_init`](crate::drivers::hw_init).
//! - **`not(target_os = "espidf")`**: keeps pin modes and levels in memory
//!   so the whole bridge runs in host tests and simulation, and lets the
//!   caller drive input levels.

use crate::app::ports::{PinDriver, PinError, PinId, PinMode};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[derive(Default)]
pub struct GpioAdapter {
    #[cfg(not(target_os = "espidf"))]
    modes: HashMap<PinId, PinMode>,
    #[cfg(not(target_os = "espidf"))]
    levels: HashMap<PinId, bool>,
}

impl GpioAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// GPIO numbers accepted by the ESP32 GPIO matrix.
const MAX_GPIO: PinId = 39;

fn check_pin(pin: PinId) -> Result<(), PinError> {
    if (0..=MAX_GPIO).contains(&pin) {
        Ok(())
    } else {
        Err(PinError::INVALID_ARG)
    }
}

#[cfg(target_os = "espidf")]
impl PinDriver for GpioAdapter {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        check_pin(pin)?;
        hw_init::gpio_configure(pin, mode).map_err(|e| PinError(e.code()))
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), PinError> {
        check_pin(pin)?;
        hw_init::gpio_write(pin, high).map_err(|e| PinError(e.code()))
    }

    fn read(&mut self, pin: PinId) -> bool {
        hw_init::gpio_read(pin)
    }
}

#[cfg(not(target_os = "espidf"))]
impl GpioAdapter {
    /// Simulate an external level on an input pin (button wiring).
    pub fn set_input_level(&mut self, pin: PinId, high: bool) {
        self.levels.insert(pin, high);
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }
}

#[cfg(not(target_os = "espidf"))]
impl PinDriver for GpioAdapter {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        check_pin(pin)?;
        self.modes.insert(pin, mode);
        // Pull resistors define the idle level of an undriven input.
        if mode.pull_up || mode.pull_down {
            self.levels.entry(pin).or_insert(mode.pull_up);
        }
        Ok(())
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), PinError> {
        check_pin(pin)?;
        if !self.modes.contains_key(&pin) {
            return Err(PinError::INVALID_ARG);
        }
        self.levels.insert(pin, high);
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> bool {
        self.levels.get(&pin).copied().unwrap_or(false)
    }
}
