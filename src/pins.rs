//! GPIO assignments for the reference boards.
//!
//! Only the default topologies in [`config`](crate::config) reference these;
//! the core itself takes every pin from the [`DeviceTopology`](crate::config::DeviceTopology).

// ---------------------------------------------------------------------------
// Single-channel light board
// ---------------------------------------------------------------------------

/// Relay / lamp output (active HIGH).
pub const LIGHT_GPIO: i32 = 25;
/// Wall switch input, active LOW with internal pull-up.
/// Must not share a GPIO with the light output.
pub const BUTTON_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Four-channel relay board
// ---------------------------------------------------------------------------

/// Relay outputs for endpoints 1–4.
pub const RELAY_GPIOS: [i32; 4] = [16, 17, 18, 19];
/// Wall switch inputs for endpoints 1–4.
pub const SWITCH_GPIOS: [i32; 4] = [32, 33, 27, 14];

// ---------------------------------------------------------------------------
// Chip constraints
// ---------------------------------------------------------------------------

/// GPIOs 34–39 have no output driver on the ESP32.
pub const INPUT_ONLY_GPIOS: core::ops::RangeInclusive<i32> = 34..=39;

/// Whether `pin` can drive a relay.
pub const fn is_output_capable(pin: i32) -> bool {
    pin >= 0 && !(pin >= *INPUT_ONLY_GPIOS.start() && pin <= *INPUT_ONLY_GPIOS.end())
}
