//! Wall-switch input driver with time-window debouncing.
//!
//! ## Hardware
//!
//! Momentary push-button, usually active-low with the internal pull-up.
//! The GPIO fires an any-edge interrupt; the ISR only queues the input id
//! (see [`events`](crate::events)).  The main loop samples the pin level
//! and feeds it to [`WallSwitch::update`].
//!
//! ## Debounce rule
//!
//! A change of the logical pressed state is accepted only when at least
//! `debounce_ms` has elapsed since the previous accepted change.  Changes
//! inside the window are ignored, not deferred; the periodic poll sees the
//! settled level once the window closes and accepts it then.

use log::info;

use crate::app::ports::{PinDriver, PinError, PinId, PinMode};
use crate::app::toggle::{Edge, InputId};
use crate::config::{ActiveLevel, InputConfig};

pub struct WallSwitch {
    input: InputId,
    pin: PinId,
    /// Raw level that means "pressed".
    pressed_level: bool,
    debounce_ms: u32,
    /// Last accepted logical state.
    pressed: bool,
    last_accept_ms: Option<u32>,
}

impl WallSwitch {
    /// Configure the input pin and resolve its active level.
    ///
    /// With [`ActiveLevel::DetectAtInit`] the level read here is taken as
    /// idle, so the switch must not be held during boot.
    pub fn init(
        pins: &mut impl PinDriver,
        input: InputId,
        cfg: &InputConfig,
        debounce_ms: u32,
    ) -> Result<Self, PinError> {
        pins.configure(cfg.pin, PinMode::input(cfg.pull_up, cfg.pull_down))?;
        let idle = pins.read(cfg.pin);

        let pressed_level = match cfg.active_level {
            ActiveLevel::High => true,
            ActiveLevel::Low => false,
            ActiveLevel::DetectAtInit => !idle,
        };

        info!(
            "input {}: GPIO {} pressed={} (idle read {})",
            input,
            cfg.pin,
            if pressed_level { "HIGH" } else { "LOW" },
            u8::from(idle)
        );

        Ok(Self {
            input,
            pin: cfg.pin,
            pressed_level,
            debounce_ms,
            pressed: idle == pressed_level,
            last_accept_ms: None,
        })
    }

    /// Feed a raw level sampled at `now_ms` (monotonic, wrapping).
    pub fn update(&mut self, now_ms: u32, raw_level: bool) -> Option<Edge> {
        let pressed = raw_level == self.pressed_level;
        if pressed == self.pressed {
            return None;
        }
        if let Some(last) = self.last_accept_ms {
            if now_ms.wrapping_sub(last) < self.debounce_ms {
                return None;
            }
        }

        self.pressed = pressed;
        self.last_accept_ms = Some(now_ms);
        Some(if pressed { Edge::Press } else { Edge::Release })
    }

    /// Read the pin and run it through [`update`](Self::update).
    pub fn sample(&mut self, pins: &mut impl PinDriver, now_ms: u32) -> Option<Edge> {
        let level = pins.read(self.pin);
        self.update(now_ms, level)
    }

    pub fn input(&self) -> InputId {
        self.input
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn pressed_level(&self) -> bool {
        self.pressed_level
    }
}
