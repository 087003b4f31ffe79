//! `embedded-hal` pin driver adapter.
//!
//! Implements [`PinDriver`] over typed `embedded-hal` 1.0 pins for boards
//! whose HAL hands out owned pin objects instead of raw GPIO numbers.  Pin
//! direction and pulls are fixed when the HAL creates the pin, so
//! [`configure`](PinDriver::configure) only checks that the requested role
//! matches a registered pin.

use embedded_hal::digital::{InputPin, PinState, StatefulOutputPin};
use heapless::Vec;

use crate::app::ports::{PinDirection, PinDriver, PinError, PinId, PinMode};
use crate::config::MAX_ENDPOINTS;

pub struct HalPinDriver<O, I> {
    outputs: Vec<(PinId, O), MAX_ENDPOINTS>,
    inputs: Vec<(PinId, I), MAX_ENDPOINTS>,
}

impl<O, I> Default for HalPinDriver<O, I> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

impl<O: StatefulOutputPin, I: InputPin> HalPinDriver<O, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an output under `id`.  Hands the pin back when full.
    pub fn with_output(mut self, id: PinId, pin: O) -> Result<Self, O> {
        self.outputs.push((id, pin)).map_err(|(_, pin)| pin)?;
        Ok(self)
    }

    /// Register an input under `id`.  Hands the pin back when full.
    pub fn with_input(mut self, id: PinId, pin: I) -> Result<Self, I> {
        self.inputs.push((id, pin)).map_err(|(_, pin)| pin)?;
        Ok(self)
    }

    fn output(&mut self, pin: PinId) -> Option<&mut O> {
        self.outputs
            .iter_mut()
            .find(|(id, _)| *id == pin)
            .map(|(_, p)| p)
    }

    fn input(&mut self, pin: PinId) -> Option<&mut I> {
        self.inputs
            .iter_mut()
            .find(|(id, _)| *id == pin)
            .map(|(_, p)| p)
    }
}

impl<O: StatefulOutputPin, I: InputPin> PinDriver for HalPinDriver<O, I> {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), PinError> {
        let known = match mode.direction {
            PinDirection::Output => self.output(pin).is_some(),
            PinDirection::Input => self.input(pin).is_some(),
        };
        if known {
            Ok(())
        } else {
            Err(PinError::INVALID_ARG)
        }
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), PinError> {
        let out = self.output(pin).ok_or(PinError::INVALID_ARG)?;
        out.set_state(PinState::from(high))
            .map_err(|_| PinError::FAIL)
    }

    fn read(&mut self, pin: PinId) -> bool {
        if let Some(out) = self.output(pin) {
            return out.is_set_high().unwrap_or(false);
        }
        self.input(pin)
            .and_then(|i| i.is_high().ok())
            .unwrap_or(false)
    }
}
