//! Device topology
//!
//! Declares which endpoints exist on the device, the relay/lamp output each
//! one drives and the wall switch (if any) that toggles it.  Passed to the
//! core at construction; there is no process-wide endpoint state.
//! Values can be overridden via NVS or JSON provisioning.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, PinId};
use crate::attribute::EndpointId;
use crate::pins;

/// Upper bound on actuator/control pairs per device.
pub const MAX_ENDPOINTS: usize = 8;

/// Debounce interval of the reference wall-switch configuration.
pub const DEFAULT_DEBOUNCE_MS: u32 = 500;

/// Output polarity: which pin level energises the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// on → high
    ActiveHigh,
    /// on → low (typical for opto-isolated relay boards)
    ActiveLow,
}

impl Polarity {
    /// Pin level that represents the commanded state `on`.
    pub const fn level_for(self, on: bool) -> bool {
        match self {
            Self::ActiveHigh => on,
            Self::ActiveLow => !on,
        }
    }
}

/// Input level that means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveLevel {
    High,
    Low,
    /// Sample the idle level at init and treat the opposite level as pressed.
    DetectAtInit,
}

/// Which debounced edges toggle the bound endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToggleEdge {
    Press,
    /// Fire on button-up.
    #[default]
    Release,
    /// Both edges toggle: a full press-release cycle toggles twice.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub pin: PinId,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub pin: PinId,
    pub active_level: ActiveLevel,
    #[serde(default)]
    pub pull_up: bool,
    #[serde(default)]
    pub pull_down: bool,
}

impl InputConfig {
    /// Active-low push-button with the internal pull-up enabled.
    pub const fn pull_up_button(pin: PinId) -> Self {
        Self {
            pin,
            active_level: ActiveLevel::Low,
            pull_up: true,
            pull_down: false,
        }
    }
}

/// One actuator/control pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint_id: EndpointId,
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub input: Option<InputConfig>,
}

/// Static description of every endpoint on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTopology {
    pub endpoints: Vec<EndpointConfig, MAX_ENDPOINTS>,
    #[serde(default)]
    pub toggle_edge: ToggleEdge,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
}

fn default_debounce_ms() -> u32 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for DeviceTopology {
    /// Single on/off light on endpoint 1 with its wall switch.
    fn default() -> Self {
        Self {
            endpoints: core::iter::once(EndpointConfig {
                endpoint_id: 1,
                actuator: ActuatorConfig {
                    pin: pins::LIGHT_GPIO,
                    polarity: Polarity::ActiveHigh,
                },
                input: Some(InputConfig::pull_up_button(pins::BUTTON_GPIO)),
            })
            .collect(),
            toggle_edge: ToggleEdge::Release,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl DeviceTopology {
    /// Four relay channels on endpoints 1–4, each with its own wall switch.
    pub fn four_channel() -> Self {
        let endpoints = pins::RELAY_GPIOS
            .iter()
            .zip(pins::SWITCH_GPIOS.iter())
            .enumerate()
            .map(|(i, (&relay, &switch))| EndpointConfig {
                endpoint_id: i as EndpointId + 1,
                actuator: ActuatorConfig {
                    pin: relay,
                    polarity: Polarity::ActiveHigh,
                },
                input: Some(InputConfig::pull_up_button(switch)),
            })
            .collect();

        Self {
            endpoints,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON topology (provisioning path).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let topology: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        topology.validate()?;
        Ok(topology)
    }

    pub fn endpoint(&self, endpoint_id: EndpointId) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.endpoint_id == endpoint_id)
    }

    /// Reject topologies that would leave an actuator unreachable or wire
    /// two roles onto one GPIO.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one endpoint is required",
            ));
        }
        if self.endpoints.iter().any(|e| e.endpoint_id == 0) {
            return Err(ConfigError::ValidationFailed(
                "endpoint 0 is the root node and cannot drive an output",
            ));
        }
        for (i, a) in self.endpoints.iter().enumerate() {
            if self.endpoints[i + 1..]
                .iter()
                .any(|b| b.endpoint_id == a.endpoint_id)
            {
                return Err(ConfigError::ValidationFailed("endpoint ids must be unique"));
            }
        }

        if self
            .endpoints
            .iter()
            .any(|e| e.actuator.pin >= 0 && !pins::is_output_capable(e.actuator.pin))
        {
            return Err(ConfigError::ValidationFailed(
                "GPIOs 34-39 are input-only and cannot drive an actuator",
            ));
        }

        let mut used: Vec<PinId, { MAX_ENDPOINTS * 2 }> = Vec::new();
        for e in &self.endpoints {
            let pins = core::iter::once(e.actuator.pin).chain(e.input.map(|i| i.pin));
            for pin in pins {
                if pin < 0 {
                    return Err(ConfigError::ValidationFailed("GPIO numbers must be >= 0"));
                }
                if used.contains(&pin) {
                    return Err(ConfigError::ValidationFailed(
                        "each GPIO may serve only one actuator or input",
                    ));
                }
                // Capacity is 2 × MAX_ENDPOINTS, one actuator + one input each.
                let _ = used.push(pin);
            }
        }

        if !(10..=5000).contains(&self.debounce_ms) {
            return Err(ConfigError::ValidationFailed("debounce_ms must be 10–5000"));
        }
        Ok(())
    }
}
