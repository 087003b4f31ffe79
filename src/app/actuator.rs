//! Actuator controller for relay / lamp outputs.
//!
//! Each [`ActuatorBinding`] ties a logical actuator to an output pin and
//! remembers the last commanded state that reached the hardware.
//!
//! ## Construction order
//!
//! [`ActuatorBank::init`] is the only way to obtain a bank.  It configures
//! every output and parks it at the *off* level, so `set_power` can never
//! run against an unconfigured pin.  An output whose pin refuses the
//! configuration stays in the bank disabled: it keeps its id and route, and
//! every `set_power` on it fails with the configure error.  The other
//! outputs are unaffected.
//!
//! ## Write policy
//!
//! Every `set_power` call writes the pin, even when the commanded state is
//! unchanged.  Re-asserting a level is not a transition, and it repairs an
//! output that was disturbed behind the driver's back.

use core::fmt;

use heapless::Vec;
use log::{error, info, warn};

use crate::app::ports::{PinDriver, PinError, PinId, PinMode};
use crate::config::{ActuatorConfig, MAX_ENDPOINTS, Polarity};
use crate::error::{HardwareError, HardwareOp};

/// Logical actuator identity, handed out by [`ActuatorBank::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActuatorId(u8);

impl ActuatorId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorBinding {
    id: ActuatorId,
    pin: PinId,
    polarity: Polarity,
    commanded: bool,
    /// Configure error that took the output out of service.
    disabled: Option<PinError>,
}

impl ActuatorBinding {
    pub fn id(&self) -> ActuatorId {
        self.id
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Last state successfully written to the hardware.
    pub fn commanded(&self) -> bool {
        self.commanded
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }
}

pub struct ActuatorBank {
    bindings: Vec<ActuatorBinding, MAX_ENDPOINTS>,
    /// Failures seen while bringing the outputs up, in actuator order.
    faults: Vec<HardwareError, MAX_ENDPOINTS>,
}

impl ActuatorBank {
    /// Configure every actuator output and drive it off.
    ///
    /// Actuators receive ids in iteration order; configs beyond
    /// [`MAX_ENDPOINTS`] are ignored.  A pin that fails to configure is
    /// disabled, a pin that fails to park stays enabled (the next write
    /// retries it).  Both are recorded in [`faults`](Self::faults).
    pub fn init<'a>(
        pins: &mut impl PinDriver,
        configs: impl IntoIterator<Item = &'a ActuatorConfig>,
    ) -> Self {
        let mut bindings = Vec::new();
        let mut faults = Vec::new();

        for (index, cfg) in configs.into_iter().take(MAX_ENDPOINTS).enumerate() {
            let id = ActuatorId(index as u8);
            let fail = |op, cause| HardwareError {
                actuator: id,
                pin: cfg.pin,
                op,
                cause,
            };

            let mut disabled = None;
            if let Err(cause) = pins.configure(cfg.pin, PinMode::OUTPUT) {
                let err = fail(HardwareOp::Configure, cause);
                error!("{}, output disabled", err);
                disabled = Some(cause);
                let _ = faults.push(err);
            } else if let Err(cause) = pins.write(cfg.pin, cfg.polarity.level_for(false)) {
                let err = fail(HardwareOp::Write { on: false }, cause);
                warn!("{}, output state unknown", err);
                let _ = faults.push(err);
            } else {
                info!("actuator {}: GPIO {} output, {:?}, off", id, cfg.pin, cfg.polarity);
            }

            let _ = bindings.push(ActuatorBinding {
                id,
                pin: cfg.pin,
                polarity: cfg.polarity,
                commanded: false,
                disabled,
            });
        }

        Self { bindings, faults }
    }

    /// Drive `id` to `on`.  The commanded state is updated only on success.
    pub fn set_power(
        &mut self,
        pins: &mut impl PinDriver,
        id: ActuatorId,
        on: bool,
    ) -> Result<(), HardwareError> {
        let Some(binding) = self.bindings.get_mut(id.index()) else {
            return Err(HardwareError {
                actuator: id,
                pin: -1,
                op: HardwareOp::Write { on },
                cause: PinError::INVALID_ARG,
            });
        };

        if let Some(cause) = binding.disabled {
            return Err(HardwareError {
                actuator: id,
                pin: binding.pin,
                op: HardwareOp::Write { on },
                cause,
            });
        }

        let level = binding.polarity.level_for(on);
        if let Err(cause) = pins.write(binding.pin, level) {
            let err = HardwareError {
                actuator: id,
                pin: binding.pin,
                op: HardwareOp::Write { on },
                cause,
            };
            error!(
                "Failed to set actuator {} GPIO {} level={} err={}",
                id,
                binding.pin,
                u8::from(level),
                cause.code()
            );
            return Err(err);
        }

        binding.commanded = on;
        Ok(())
    }

    /// Last successfully commanded state of `id`.
    pub fn commanded(&self, id: ActuatorId) -> Option<bool> {
        self.binding(id).map(ActuatorBinding::commanded)
    }

    /// Physical state of `id` as read back from its pin, polarity applied.
    /// `None` for a disabled output.
    pub fn output_state(&self, pins: &mut impl PinDriver, id: ActuatorId) -> Option<bool> {
        let b = self.binding(id).filter(|b| b.is_enabled())?;
        let level = pins.read(b.pin);
        Some(level == b.polarity.level_for(true))
    }

    pub fn binding(&self, id: ActuatorId) -> Option<&ActuatorBinding> {
        self.bindings.get(id.index())
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ActuatorBinding> {
        self.bindings.iter()
    }

    pub fn faults(&self) -> impl Iterator<Item = &HardwareError> {
        self.faults.iter()
    }

    /// Outputs that came up and accept writes.
    pub fn enabled(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_enabled()).count()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
